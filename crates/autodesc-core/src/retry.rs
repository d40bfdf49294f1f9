// SPDX-License-Identifier: Apache-2.0

//! Retry logic with exponential backoff for dropped connections.
//!
//! Only failures where the connection to the completion API went away are
//! retried. HTTP error statuses, malformed bodies and timeouts surface
//! immediately.

use std::error::Error as StdError;
use std::io::ErrorKind;
use std::time::Duration;

use backon::ExponentialBuilder;

use crate::error::AutodescError;

/// Default number of attempts for a completion call.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Determines if an I/O error kind means the peer dropped the connection.
#[must_use]
pub fn is_connection_dropped(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof
    )
}

/// Walks an error's source chain looking for a dropped connection.
#[must_use]
pub fn chain_has_dropped_connection(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>()
            && is_connection_dropped(io.kind())
        {
            return true;
        }
        current = e.source();
    }
    false
}

/// Determines if an error is a transient network failure worth retrying.
///
/// Only errors whose source chain holds an I/O error for a reset, aborted,
/// broken or prematurely closed connection are retried. Refused connections,
/// DNS failures and timeouts are not.
#[must_use]
pub fn is_transient_network_error(e: &AutodescError) -> bool {
    match e {
        AutodescError::Network(req_err) => chain_has_dropped_connection(req_err),
        _ => false,
    }
}

/// Same check as [`is_transient_network_error`] for `anyhow` errors.
#[must_use]
pub fn is_transient_anyhow(e: &anyhow::Error) -> bool {
    if let Some(autodesc_err) = e.downcast_ref::<AutodescError>() {
        return is_transient_network_error(autodesc_err);
    }
    if let Some(req_err) = e.downcast_ref::<reqwest::Error>() {
        return chain_has_dropped_connection(req_err);
    }
    e.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| is_connection_dropped(io.kind()))
    })
}

/// Creates a configured exponential backoff builder for retries.
///
/// - Factor: 2
/// - Min delay: 1 second
/// - Max delay: 30 seconds
/// - Max times: `max_attempts - 1` retries after the first attempt
/// - Jitter: enabled
#[must_use]
pub fn retry_backoff(max_attempts: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_factor(2.0)
        .with_min_delay(Duration::from_secs(1))
        .with_max_delay(Duration::from_secs(30))
        .with_max_times(max_attempts.saturating_sub(1))
        .with_jitter()
}
