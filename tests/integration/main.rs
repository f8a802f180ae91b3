//! End-to-end tests against a real server on an ephemeral port.

mod helpers;
mod http_test;
mod ws_test;
