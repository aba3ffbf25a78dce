#![no_main]

use std::io::{Cursor, Read};

use arbitrary::Arbitrary;
use courier_proto::{Attachment, ValidationError};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    data: Option<Vec<u8>>,
    content_type: Option<String>,
    filename: Option<String>,
    length: u64,
}

fuzz_target!(|input: Input| {
    let mut builder = Attachment::stream_builder().with_length(input.length);
    if let Some(data) = input.data.clone() {
        builder = builder.with_stream(Cursor::new(data));
    }
    if let Some(content_type) = input.content_type.clone() {
        builder = builder.with_content_type(content_type);
    }
    if let Some(filename) = input.filename.clone() {
        builder = builder.with_filename(filename);
    }

    let content_type_valid = input.content_type.as_deref().is_some_and(|c| !c.is_empty());

    match builder.build() {
        Ok(stream) => {
            assert!(input.data.is_some() && content_type_valid && input.length != 0);
            assert_eq!(stream.filename(), input.filename.as_deref());

            let mut bytes = Vec::new();
            stream.into_data().read_to_end(&mut bytes).unwrap();
            assert_eq!(Some(bytes), input.data);
        },
        Err(ValidationError::MissingDataSource) => assert!(input.data.is_none()),
        Err(ValidationError::MissingContentType) => {
            assert!(input.data.is_some() && !content_type_valid);
        },
        Err(ValidationError::MissingLength) => {
            assert!(input.data.is_some() && content_type_valid && input.length == 0);
        },
        Err(other) => panic!("unexpected error: {other}"),
    }
});
