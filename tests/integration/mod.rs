//! Integration test modules.

mod feed_test;
mod friendship_flow_test;
mod leaderboard_flow_test;
mod live_session_test;
mod support;
