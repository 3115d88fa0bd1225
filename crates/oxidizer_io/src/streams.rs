// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! General purpose abstractions for streams of bytes that can be read and written.

mod read_stream;
mod read_stream_ext;
mod read_stream_futures;
mod write_stream;
mod write_stream_ext;

pub use read_stream::*;
pub use read_stream_ext::*;
pub use read_stream_futures::*;
pub use write_stream::*;
pub use write_stream_ext::*;