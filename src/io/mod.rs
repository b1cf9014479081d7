// Purpose - audio device streams

pub mod device;

pub use device::{open_input, open_output, AudioError, InputStream, OutputStream, INPUT_FRAME_SIZE};
