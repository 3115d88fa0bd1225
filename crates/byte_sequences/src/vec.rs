// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use bytes::Bytes;

use crate::ByteSequence;

impl From<Vec<u8>> for ByteSequence {
    fn from(value: Vec<u8>) -> Self {
        Bytes::from(value).into()
    }
}
