//! Unit test modules.

mod invite_code_test;
mod leaderboard_test;
mod social_types_test;
