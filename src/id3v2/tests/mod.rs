
use std::io::Cursor;

use crate::id3v2::frames::*;
use crate::id3v2::read::{self, ByteReader};
use crate::id3v2::tools::encode_synch_int;
use crate::id3v2::validate::ValidationFailure;
use crate::id3v2::write;
use crate::id3v2::*;
use crate::tools::encoding::{TextEncoding, DEFAULT_CODE_PAGE};
use crate::Error;

fn tag_bytes(version: u8, flags: u8, body: &[u8]) -> Vec<u8> {
    let mut v = b"ID3".to_vec();
    v.push(version);
    v.push(0x00);
    v.push(flags);
    v.extend_from_slice(&encode_synch_int(body.len() as u32).unwrap());
    v.extend_from_slice(body);
    v
}

fn audio(len: usize) -> Vec<u8> {
    let mut v: Vec<u8> = (0..len).map(|i| (i * 31 % 251) as u8).collect();
    // mpeg frame sync up front
    v[0] = 0xFF;
    v[1] = 0xFB;
    v
}

fn sample_tag(version: u8) -> Tag {
    let mut tag = Tag::new(version);
    tag.options.padding = 64;
    tag.add_frame(TextFrame::new("TIT2", TextEncoding::Latin1, "Hello"));
    tag.add_frame(TextFrame::new("TPE1", TextEncoding::Utf16, "伊賀拓郎"));
    tag.add_frame(UserTextFrame::new(TextEncoding::Latin1, "MOOD", "calm"));
    tag.add_frame(CommentFrame::new(TextEncoding::Utf16, "", "Test Comments"));
    tag.add_frame(PictureFrame::new(
        TextEncoding::Latin1,
        "image/jpeg",
        0x03,
        "",
        vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0x00, 0xFF],
    ));
    tag
}

#[test]
fn header_only_test() {
    let mut file = vec![0x49, 0x44, 0x33, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x08];
    file.extend_from_slice(&[0; 8]);

    let raw = get_raw(&mut Cursor::new(file)).unwrap();
    assert_eq!(raw.version, 3);
    assert_eq!(raw.revision, 0);
    assert!(!raw.flags.experimental);
    assert!(!raw.flags.unsynchronisation);
    assert!(!raw.flags.extended_header);
    assert_eq!(raw.extended_header, None);
    assert!(raw.frames.is_empty());
    assert_eq!(raw.padding_size, 8);
}

#[test]
fn extended_header_v3_test() {
    let header = read::decode_header(&[0x49, 0x44, 0x33, 0x03, 0x00, 0xE0, 0x00, 0x00, 0x00, 0x18])
        .unwrap();
    assert!(header.flags.unsynchronisation);
    assert!(header.flags.extended_header);
    assert!(header.flags.experimental);
    assert!(!header.flags.footer);
    assert_eq!(header.size, 0x18);

    let mut body = vec![
        0x00, 0x00, 0x00, 0x0A, // size, not counting itself
        0x80, 0x00, // crc present
        0x00, 0x00, 0x00, 0x0A, // padding
        0x30, 0x31, 0x32, 0x33, // crc
    ];
    let mut input = ByteReader::new(&body);
    let e = read::extended_header(3, &mut input).unwrap();
    assert_eq!(input.position(), 14);
    assert_eq!(
        e,
        ExtendedHeader::V3 {
            padding_size: 10,
            crc32: Some(0x30313233),
        }
    );
    assert!(e.crc_present());
    assert_eq!(write::encode_extended_header(&e).unwrap(), body);

    // there are no frames for that CRC to match
    body.extend_from_slice(&[0; 10]);
    let file = tag_bytes(3, 0xE0, &body);
    match get_raw(&mut Cursor::new(file)) {
        Err(Error::IntegrityError { expected, actual }) => {
            assert_eq!(expected, 0x30313233);
            assert_eq!(actual, 0);
        }
        x => panic!("expected an integrity error, got {:?}", x),
    }
}

#[test]
fn extended_header_v4_test() {
    let e = ExtendedHeader::V4 {
        tag_is_update: false,
        crc32: Some(0xCBF43926),
        restrictions: None,
    };
    let bytes = write::encode_extended_header(&e).unwrap();
    assert_eq!(
        bytes,
        vec![0x00, 0x00, 0x00, 0x0C, 0x01, 0x20, 0x05, 0x0C, 0x5F, 0x50, 0x72, 0x26]
    );

    for &update in [false, true].iter() {
        for &crc in [None, Some(0), Some(0xFFFFFFFF)].iter() {
            for &restrictions in [None, Some(0x00), Some(0xB5)].iter() {
                let e = ExtendedHeader::V4 {
                    tag_is_update: update,
                    crc32: crc,
                    restrictions,
                };
                let bytes = write::encode_extended_header(&e).unwrap();
                let mut input = ByteReader::new(&bytes);
                assert_eq!(read::extended_header(4, &mut input).unwrap(), e);
                assert_eq!(input.remaining(), 0);
            }
        }
    }
}

#[test]
fn extended_header_errors_test() {
    // crc block must say 5
    let bytes = [0x00, 0x00, 0x00, 0x0C, 0x01, 0x20, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00];
    assert!(match read::extended_header(4, &mut ByteReader::new(&bytes)) {
        Err(Error::FormatError(_)) => true,
        _ => false,
    });

    // v2.4 size counts itself, so anything under 6 is wrong
    let bytes = [0x00, 0x00, 0x00, 0x04, 0x01, 0x00];
    assert!(read::extended_header(4, &mut ByteReader::new(&bytes)).is_err());

    // runs off the end of the tag
    let bytes = [0x00, 0x00, 0x00, 0x0A, 0x80, 0x00, 0x00, 0x00];
    assert!(match read::extended_header(3, &mut ByteReader::new(&bytes)) {
        Err(Error::FormatError(_)) => true,
        _ => false,
    });

    // v2.3 size smaller than its own fields
    let bytes = [0x00, 0x00, 0x00, 0x06, 0x80, 0x00, 0, 0, 0, 0, 1, 2, 3, 4];
    assert!(read::extended_header(3, &mut ByteReader::new(&bytes)).is_err());
}

#[test]
fn frame_header_test() {
    let f = read::frame_header(&[0x31, 0x32, 0x33, 0x34, 0x00, 0x00, 0x00, 0x0B, 0x00, 0x80], 3)
        .unwrap()
        .unwrap();
    assert_eq!(f.name, "1234");
    assert_eq!(f.size, 11);
    assert_eq!(
        f.flags,
        FrameFlags::V3(V3FrameFlags {
            compression: true,
            ..Default::default()
        })
    );

    let mut body = vec![0x31, 0x32, 0x33, 0x34, 0x00, 0x00, 0x00, 0x0B, 0x00, 0x80];
    body.extend_from_slice(b"hello world");
    let raw = get_raw(&mut Cursor::new(tag_bytes(3, 0x00, &body))).unwrap();
    assert_eq!(raw.frames.len(), 1);
    let frame = &raw.frames[0];
    assert_eq!(frame.id, "1234");
    assert_eq!(frame.payload.len(), 11);
    assert!(frame.flags.compression());
    assert!(!frame.flags.encryption());
    assert!(!frame.flags.grouping());
    assert_eq!(frame.flags.encode(), [0x00, 0x80]);
}

#[test]
fn frame_header_size_test() {
    // 0x80 bytes: plain in v2.3, synchsafe in v2.4
    assert_eq!(
        read::frame_header(b"TIT2\x00\x00\x00\x80\x00\x00", 3).unwrap().unwrap().size,
        0x80
    );
    assert_eq!(
        read::frame_header(b"TIT2\x00\x00\x01\x00\x00\x00", 4).unwrap().unwrap().size,
        0x80
    );

    let frame = RawFrame {
        id: "TIT2".to_string(),
        flags: FrameFlags::empty(3),
        payload: vec![0x00; 200],
    };
    assert_eq!(&write::encode_frame(&frame, 3).unwrap()[4..8], &[0x00, 0x00, 0x00, 0xC8]);
    assert_eq!(&write::encode_frame(&frame, 4).unwrap()[4..8], &[0x00, 0x00, 0x01, 0x48]);
}

#[test]
fn end_of_frames_test() {
    assert_eq!(read::frame_header(&[0; 10], 4).unwrap(), None);
    // only the first three bytes have to be zero
    assert_eq!(read::frame_header(b"\x00\x00\x00X\x00\x00\x00\x01\x00\x00", 3).unwrap(), None);
    assert!(read::frame_header(b"tit2\x00\x00\x00\x01\x00\x00", 3).is_err());

    // a frame, then a stub too short to be a frame header
    let mut body = b"TIT2\x00\x00\x00\x02\x00\x00\x00a".to_vec();
    body.extend_from_slice(b"TPE1\x00");
    let raw = get_raw(&mut Cursor::new(tag_bytes(3, 0x00, &body))).unwrap();
    assert_eq!(raw.frames.len(), 1);
    assert_eq!(raw.padding_size, 5);
}

#[test]
fn frame_flags_test() {
    for bits in 0..64u8 {
        let f = V3FrameFlags {
            tag_alter_preservation: bits & 1 != 0,
            file_alter_preservation: bits & 2 != 0,
            read_only: bits & 4 != 0,
            compression: bits & 8 != 0,
            encryption: bits & 16 != 0,
            grouping: bits & 32 != 0,
        };
        assert_eq!(V3FrameFlags::decode(f.encode()), f);
        assert_eq!(FrameFlags::decode(3, f.encode()), FrameFlags::V3(f));
    }
    for bits in 0..=255u8 {
        let f = V4FrameFlags {
            tag_alter_preservation: bits & 1 != 0,
            file_alter_preservation: bits & 2 != 0,
            read_only: bits & 4 != 0,
            compression: bits & 8 != 0,
            encryption: bits & 16 != 0,
            grouping: bits & 32 != 0,
            unsynchronisation: bits & 64 != 0,
            data_length_indicator: bits & 128 != 0,
        };
        assert_eq!(V4FrameFlags::decode(f.encode()), f);
    }

    // same logical flag, different bits
    let v3 = V3FrameFlags {
        tag_alter_preservation: true,
        read_only: true,
        ..Default::default()
    };
    let v4 = FrameFlags::V3(v3).to_version(4).unwrap();
    assert_eq!(v3.encode(), [0xA0, 0x00]);
    assert_eq!(v4.encode(), [0x50, 0x00]);
    assert_eq!(v4.version(), 4);
    assert_eq!(v4.to_version(3).unwrap(), FrameFlags::V3(v3));
    assert_eq!(FrameFlags::decode(4, [0x00, 0x80]), FrameFlags::empty(4));
}

#[test]
fn frame_flags_version_change_test() {
    // payload layout depends on these, so they stay in their own version
    let v3 = FrameFlags::V3(V3FrameFlags {
        compression: true,
        ..Default::default()
    });
    assert_eq!(v3.to_version(3).unwrap(), v3);
    assert!(match v3.to_version(4) {
        Err(Error::FormatError(_)) => true,
        _ => false,
    });

    for &b in [0x40u8, 0x08, 0x04, 0x02, 0x01].iter() {
        let v4 = FrameFlags::decode(4, [0x00, b]);
        assert_eq!(v4.to_version(4).unwrap(), v4);
        assert!(v4.to_version(3).is_err(), "flags {:02X} moved to v2.3", b);
    }
    for &b in [0x80u8, 0x40, 0x20].iter() {
        assert!(FrameFlags::decode(3, [0x00, b]).to_version(4).is_err());
    }
}

#[test]
fn opaque_frame_version_change_test() {
    // TIT2 with a data length indicator in front of its text
    let body = b"TIT2\x00\x00\x00\x09\x00\x01\x00\x00\x00\x05\x00abc\x00".to_vec();
    let mut tag = get(&mut Cursor::new(tag_bytes(4, 0x00, &body)), DEFAULT_CODE_PAGE).unwrap();
    assert_eq!(tag.frames[0].kind(), FrameKind::Binary);

    // written back as v2.4 it is untouched
    let mut output = Vec::new();
    set(&tag, &mut Cursor::new(Vec::new()), &mut output).unwrap();
    let raw = get_raw(&mut Cursor::new(output)).unwrap();
    assert_eq!(raw.frames[0].payload, b"\x00\x00\x00\x05\x00abc\x00".to_vec());
    assert_eq!(raw.frames[0].flags.encode(), [0x00, 0x01]);

    tag.version = 3;
    match write::render(&tag) {
        Err(Error::FormatError(_)) => (),
        x => panic!("expected a format error, got {:?}", x),
    }
    let mut output = Vec::new();
    assert!(set(&tag, &mut Cursor::new(Vec::new()), &mut output).is_err());
    assert!(output.is_empty());
}

#[test]
fn header_round_trip_test() {
    for &version in [3u8, 4].iter() {
        for bits in 0..16u8 {
            let flags = HeaderFlags {
                unsynchronisation: bits & 1 != 0,
                extended_header: bits & 2 != 0,
                experimental: bits & 4 != 0,
                footer: bits & 8 != 0,
            };
            let header = Header {
                version,
                revision: 0,
                flags,
                size: 123456,
            };
            if flags.footer && version == 3 {
                assert!(write::encode_header(&header).is_err());
                continue;
            }
            let bytes = write::encode_header(&header).unwrap();
            assert_eq!(read::decode_header(&bytes).unwrap(), header);
        }
    }
}

#[test]
fn header_errors_test() {
    match get_raw(&mut Cursor::new(b"TAGsome title".to_vec())) {
        Err(Error::WrongTagKind) => (),
        x => panic!("expected WrongTagKind, got {:?}", x),
    }
    match get_raw(&mut Cursor::new(audio(100))) {
        Err(Error::HeaderNotFound) => (),
        x => panic!("expected HeaderNotFound, got {:?}", x),
    }
    match get_raw(&mut Cursor::new(Vec::new())) {
        Err(Error::HeaderNotFound) => (),
        x => panic!("expected HeaderNotFound, got {:?}", x),
    }
    // ID3v2.2
    assert!(read::decode_header(b"ID3\x02\x00\x00\x00\x00\x00\x00").is_err());
    // undefined flag bits
    assert!(read::decode_header(b"ID3\x03\x00\x10\x00\x00\x00\x00").is_err());
    assert!(read::decode_header(b"ID3\x04\x00\x01\x00\x00\x00\x00").is_err());
    // 0xFF is never a valid revision
    match read::decode_header(b"ID3\x03\xFF\x00\x00\x00\x00\x00") {
        Err(Error::FormatError(_)) => (),
        x => panic!("expected a format error, got {:?}", x),
    }
    assert!(read::decode_header(b"ID3\x03\x01\x00\x00\x00\x00\x00").is_ok());
}

#[test]
fn size_errors_test() {
    // claims 100 bytes, has 4
    let mut file = tag_bytes(4, 0x00, &[0; 4]);
    file[9] = 100;
    assert!(match get_raw(&mut Cursor::new(file)) {
        Err(Error::FormatError(_)) => true,
        _ => false,
    });

    // frame claims more than the tag holds
    let body = b"TIT2\x00\x00\x00\x7F\x00\x00\x00abc".to_vec();
    assert!(match get_raw(&mut Cursor::new(tag_bytes(4, 0x00, &body))) {
        Err(Error::FormatError(_)) => true,
        _ => false,
    });
}

#[test]
fn render_test() {
    let mut tag = Tag::new(3);
    tag.options.padding = 0;
    tag.add_frame(TextFrame::new("TIT2", TextEncoding::Latin1, "abc"));

    assert_eq!(
        write::render(&tag).unwrap(),
        b"ID3\x03\x00\x00\x00\x00\x00\x0FTIT2\x00\x00\x00\x05\x00\x00\x00abc\x00".to_vec()
    );
}

#[test]
fn write_read_test() {
    for &version in [3u8, 4].iter() {
        let tag = sample_tag(version);
        let audio = audio(200 * 1024);
        let mut output = Vec::new();
        set(&tag, &mut Cursor::new(audio.clone()), &mut output).unwrap();

        // audio is carried over untouched
        assert_eq!(&output[output.len() - audio.len()..], &audio[..]);

        let raw = get_raw(&mut Cursor::new(output.clone())).unwrap();
        assert_eq!(raw.version, version);
        assert_eq!(raw.frames.len(), 5);
        assert_eq!(raw.padding_size, 64);
        assert_eq!(raw.frames[0].id, "TIT2");
        assert_eq!(raw.frames[0].payload, b"\x00Hello\x00".to_vec());

        let read = get(&mut Cursor::new(output), DEFAULT_CODE_PAGE).unwrap();
        assert_eq!(read.version, version);
        assert_eq!(read.frames.len(), 5);
        assert_eq!(read.frame("TPE1").unwrap().kind(), FrameKind::Text);
        assert_eq!(read.frame("APIC").unwrap().kind(), FrameKind::Picture);
    }
}

#[test]
fn crc_test() {
    for &version in [3u8, 4].iter() {
        let mut tag = sample_tag(version);
        tag.options.extended_header = Some(ExtendedHeaderOptions {
            crc: true,
            ..Default::default()
        });
        let bytes = write::render(&tag).unwrap();

        let raw = get_raw(&mut Cursor::new(bytes.clone())).unwrap();
        let e = raw.extended_header.unwrap();
        assert!(e.crc_present());
        if let ExtendedHeader::V3 { padding_size, .. } = e {
            assert_eq!(padding_size, 64);
        }

        // flip one byte of the TIT2 payload
        let mut corrupt = bytes.clone();
        let i = corrupt.windows(5).position(|w| w == b"Hello").unwrap();
        corrupt[i] = b'J';
        match get_raw(&mut Cursor::new(corrupt)) {
            Err(Error::IntegrityError { expected, .. }) => assert_eq!(Some(expected), e.crc32()),
            x => panic!("expected an integrity error, got {:?}", x),
        }
    }
}

#[test]
fn unsynchronisation_test() {
    let mut tag = sample_tag(3);
    tag.options.unsynchronisation = true;
    let bytes = write::render(&tag).unwrap();

    assert_eq!(bytes[5] & 0x80, 0x80);
    for w in bytes[10..].windows(2) {
        assert!(!(w[0] == 0xFF && w[1] >= 0xE0));
    }

    let plain = write::render(&sample_tag(3)).unwrap();
    assert!(bytes.len() > plain.len());

    let raw = get_raw(&mut Cursor::new(bytes)).unwrap();
    let raw_plain = get_raw(&mut Cursor::new(plain)).unwrap();
    assert_eq!(raw.frames, raw_plain.frames);
}

#[test]
fn footer_test() {
    let mut tag = sample_tag(4);
    tag.options.footer = true;
    let audio = audio(1000);
    let mut output = Vec::new();
    set(&tag, &mut Cursor::new(audio.clone()), &mut output).unwrap();

    let tag_len = output.len() - audio.len();
    assert_eq!(&output[tag_len - 10..tag_len - 7], b"3DI");
    assert_eq!(&output[tag_len - 7..tag_len], &output[3..10]);

    let length = write::existing_tag_length(&mut Cursor::new(output.clone())).unwrap();
    assert_eq!(length as usize, tag_len);

    let raw = get_raw(&mut Cursor::new(output)).unwrap();
    assert!(raw.flags.footer);
    assert_eq!(raw.padding_size, 0);
    assert_eq!(raw.frames.len(), 5);
}

#[test]
fn replace_existing_tag_test() {
    let audio = audio(5000);
    let mut first = Vec::new();
    set(&sample_tag(4), &mut Cursor::new(audio.clone()), &mut first).unwrap();

    let mut tag = Tag::new(3);
    tag.add_frame(TextFrame::new("TALB", TextEncoding::Latin1, "Album"));
    let mut second = Vec::new();
    set(&tag, &mut Cursor::new(first), &mut second).unwrap();

    let expected = write::render(&tag).unwrap();
    assert_eq!(&second[..expected.len()], &expected[..]);
    assert_eq!(&second[expected.len()..], &audio[..]);
}

#[test]
fn validation_test() {
    let mut tag = Tag::new(3);
    tag.add_frame(TextFrame::new("TIT2", TextEncoding::Utf8, "Hello"));

    let mut output = Vec::new();
    match set(&tag, &mut Cursor::new(audio(100)), &mut output) {
        Err(Error::StructureInvalid(ValidationFailure::EncodingNotAllowed {
            frame_id,
            kind,
            encoding,
        })) => {
            assert_eq!(frame_id, "TIT2");
            assert_eq!(kind, FrameKind::Text);
            assert_eq!(encoding, TextEncoding::Utf8);
        }
        x => panic!("expected a validation failure, got {:?}", x),
    }
    // nothing written
    assert!(output.is_empty());

    for &encoding in [TextEncoding::Latin1, TextEncoding::Utf16].iter() {
        let mut tag = Tag::new(3);
        tag.add_frame(TextFrame::new("TIT2", encoding, "Hello"));
        assert!(validate::validate(&tag).is_ok());
    }

    let mut tag = Tag::new(3);
    tag.add_frame(UserUrlLinkFrame::new(
        TextEncoding::Utf16Be,
        "home",
        "http://example.com",
    ));
    match validate::validate(&tag) {
        Err(ValidationFailure::EncodingNotAllowed { frame_id, kind, .. }) => {
            assert_eq!(frame_id, "WXXX");
            assert_eq!(kind, FrameKind::UserUrlLink);
        }
        x => panic!("expected a validation failure, got {:?}", x),
    }

    // v2.4 takes every encoding
    let mut tag = Tag::new(4);
    tag.add_frame(TextFrame::new("TIT2", TextEncoding::Utf8, "Hello"));
    tag.add_frame(TextFrame::new("TIT3", TextEncoding::Utf16Be, "Hello"));
    assert!(validate::validate(&tag).is_ok());

    assert_eq!(
        validate::validate(&Tag::new(2)),
        Err(ValidationFailure::UnsupportedVersion(2))
    );
    let mut tag = Tag::new(4);
    tag.add_frame(TextFrame::new("TT2", TextEncoding::Latin1, "Hello"));
    assert_eq!(
        validate::validate(&tag),
        Err(ValidationFailure::InvalidFrameId("TT2".to_string()))
    );
}

#[test]
fn idempotence_test() {
    for &version in [3u8, 4].iter() {
        for &unsynch in [false, true].iter() {
            let mut tag = sample_tag(version);
            tag.options.unsynchronisation = unsynch;
            tag.options.extended_header = Some(ExtendedHeaderOptions {
                crc: true,
                is_update: version == 4,
                restrictions: if version == 4 { Some(0x12) } else { None },
            });

            let audio = audio(3000);
            let mut first = Vec::new();
            set(&tag, &mut Cursor::new(audio.clone()), &mut first).unwrap();

            let mut again = Vec::new();
            set(&tag, &mut Cursor::new(audio), &mut again).unwrap();
            assert_eq!(first, again);

            let read = get(&mut Cursor::new(first.clone()), DEFAULT_CODE_PAGE).unwrap();
            assert_eq!(read.options, tag.options);

            let mut second = Vec::new();
            set(&read, &mut Cursor::new(first.clone()), &mut second).unwrap();
            assert_eq!(first, second);
        }
    }
}
