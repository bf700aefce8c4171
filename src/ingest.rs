//! Line-delimited JSON Ingestion
//!
//! Reads one JSON event per line (see [`crate::event`] for the format) and
//! publishes each decoded event on the bus. Lets the exporter sit at the end
//! of a pipe from any protocol parser that can print JSON.

use crate::bus::EventBus;
use crate::event::ParsedEvent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// Publishes every decodable line from `reader` until EOF.
///
/// Blank lines are skipped silently, undecodable lines with a warning.
/// Returns the number of events published.
pub async fn publish_lines<R>(reader: R, bus: &EventBus) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0usize;
    let mut published = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match ParsedEvent::from_json(line) {
            Ok(event) => {
                let listeners = bus.publish(event);
                debug!("Published line {} to {} listeners", line_no, listeners);
                published += 1;
            }
            Err(e) => warn!("Skipping line {}: {}", line_no, e),
        }
    }

    info!("Input closed after {} lines, {} events published", line_no, published);
    Ok(published)
}
