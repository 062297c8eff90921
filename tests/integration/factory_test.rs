//! Integration tests for the stream factory

use serde_json::json;
use tostring::config::PLACEHOLDER;
use tostring::{create, create_factory, pump, Chunk, StreamOptions, StringifyStream};

fn run(stream: &mut StringifyStream, chunks: Vec<Chunk>) -> Vec<String> {
    let mut outputs = Vec::new();
    pump(stream, chunks, |output| {
        outputs.push(output);
        Ok(())
    })
    .unwrap();
    outputs
}

fn sample() -> Vec<Chunk> {
    vec![
        Chunk::from(json!({"a": [1, 2]})),
        Chunk::Absent,
        Chunk::from(2.5f64),
        Chunk::from("text"),
    ]
}

#[cfg(test)]
mod factory_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_factory_streams_match_direct_construction() {
        let options = StreamOptions::structured().with_placeholder("BEEP");
        let factory = create_factory(&options);

        let mut from_factory = factory.create().unwrap();
        let mut direct = create(options).unwrap();

        assert_eq!(from_factory.config(), direct.config());
        assert_eq!(run(&mut from_factory, sample()), run(&mut direct, sample()));
    }

    #[test]
    fn test_factory_streams_are_independent() {
        let create_stream = create_factory(&StreamOptions::structured()).into_fn();
        let mut first = create_stream().unwrap();
        let mut second = create_stream().unwrap();

        assert!(first.destroy(None));
        assert!(!first.destroy(None));
        assert!(!second.is_destroyed());
        assert!(second.destroy(None));

        let mut third = create_stream().unwrap();
        assert_eq!(run(&mut third, sample()).len(), 4);
    }

    #[test]
    fn test_factory_snapshot_is_taken_once() {
        let mut options = StreamOptions::structured().with_placeholder("BEEP");
        let factory = create_factory(&options);
        options.set(PLACEHOLDER, "BOOP");

        let mut stream = factory.create().unwrap();
        assert_eq!(run(&mut stream, vec![Chunk::Absent]), vec!["BEEP"]);
    }

    #[test]
    fn test_factory_ignores_unrecognized_options() {
        let mut options = StreamOptions::structured();
        options.set("read", json!("custom"));
        options.set("write", json!(42));

        let factory = create_factory(&options);
        assert!(!factory.options().contains("read"));
        assert!(!factory.options().contains("write"));
        assert!(factory.create().is_ok());
    }
}
