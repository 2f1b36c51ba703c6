//! Building `rodio` sinks from in-memory preview bytes.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::decoder::DecoderError;
use rodio::{Decoder, OutputStream, Sink, Source};

/// Decode `bytes` into a paused `Sink` positioned at zero.
///
/// Returns the sink and the stream length when the container reports one.
pub(super) fn create_paused_sink(
    stream: &OutputStream,
    bytes: &Arc<[u8]>,
    hint: Option<&str>,
    volume: f32,
) -> Result<(Sink, Option<Duration>), DecoderError> {
    let mut builder = Decoder::builder()
        .with_data(Cursor::new(Arc::clone(bytes)))
        .with_byte_len(bytes.len() as u64)
        .with_seekable(true);
    if let Some(hint) = hint {
        builder = builder.with_hint(hint);
    }
    let source = builder.build()?;
    let duration = source.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.pause();
    sink.set_volume(volume);
    sink.append(source);
    Ok((sink, duration))
}
