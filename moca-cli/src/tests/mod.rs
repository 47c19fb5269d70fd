//! Shared test harness modules for the Moca CLI.

use super::*;

mod helpers;
