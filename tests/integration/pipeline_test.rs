//! Integration tests for driving the stream through `futures` Sink/Stream
//!
//! A writer task and a reader task run concurrently on one executor; the
//! small high-water mark forces the writer to wait for the reader.

use futures::executor::block_on;
use futures::{stream, SinkExt, StreamExt};
use serde_json::json;
use tostring::{create, Chunk, StreamError, StreamOptions};

#[cfg(test)]
mod pipeline_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sink_and_stream_preserve_order_under_backpressure() {
        let options = StreamOptions::structured().with_high_water_mark(2);
        let (mut writer, reader) = create(options).unwrap().split();

        let chunks: Vec<Chunk> = (0..50i64).map(|i| Chunk::from(json!({ "n": i }))).collect();
        let expected: Vec<String> = (0..50).map(|i| format!("{{\"n\":{}}}", i)).collect();

        let (written, outputs) = block_on(async {
            let write = async {
                let mut input = stream::iter(chunks.into_iter().map(Ok::<Chunk, StreamError>));
                writer.send_all(&mut input).await?;
                writer.close().await
            };
            futures::join!(write, reader.collect::<Vec<String>>())
        });

        written.unwrap();
        assert_eq!(outputs, expected);
    }

    #[test]
    fn test_zero_high_water_mark_still_flows() {
        let options = StreamOptions::new().with_high_water_mark(0);
        let (mut writer, reader) = create(options).unwrap().split();

        let (written, outputs) = block_on(async {
            let write = async {
                for line in ["beep", "boop", "bop"] {
                    writer.send(Chunk::from(line.as_bytes())).await?;
                }
                writer.close().await
            };
            futures::join!(write, reader.collect::<Vec<String>>())
        });

        written.unwrap();
        assert_eq!(outputs, vec!["beep", "boop", "bop"]);
    }

    #[test]
    fn test_stream_ends_when_destroyed() {
        let mut stringify = create(StreamOptions::new()).unwrap();
        stringify.write("never read").unwrap();
        stringify.destroy(None);

        let outputs: Vec<String> = block_on(stringify.collect());
        assert!(outputs.is_empty());
    }

    #[test]
    fn test_sink_rejects_writes_after_close() {
        let mut stringify = create(StreamOptions::new()).unwrap();
        let result = block_on(async {
            stringify.close().await?;
            stringify.send(Chunk::from("late")).await
        });
        assert!(matches!(result, Err(StreamError::WriteAfterEnd)));
    }

    #[test]
    fn test_sink_rejects_non_text_in_byte_mode() {
        let mut stringify = create(StreamOptions::new()).unwrap();
        let result = block_on(stringify.send(Chunk::from(1.0f64)));
        assert!(matches!(result, Err(StreamError::InvalidChunk { kind: "number" })));
    }
}
