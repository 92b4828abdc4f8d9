mod charts;
mod common;
mod readiness;
