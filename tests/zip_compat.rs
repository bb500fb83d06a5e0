use s_unzip::{extract, CompressionMethod, EntryType, StreamingZipReader};
use std::io::{Cursor, Write};
use tempfile::tempdir;
use zip::write::SimpleFileOptions;

// Archives written by the `zip` crate must read back byte for byte.

fn build_with_zip_crate() -> (Vec<u8>, Vec<u8>) {
    let big: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let deflated =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    writer.add_directory("assets/", stored).unwrap();
    writer.start_file("assets/hello.txt", stored).unwrap();
    writer.write_all(b"hello from the zip crate").unwrap();
    writer.start_file("assets/data/big.bin", deflated).unwrap();
    writer.write_all(&big).unwrap();
    writer.set_comment("written for interop");

    let bytes = writer.finish().unwrap().into_inner();
    (bytes, big)
}

#[test]
fn reads_archive_written_by_zip_crate() {
    let dir = tempdir().unwrap();
    let (bytes, big) = build_with_zip_crate();
    let path = dir.path().join("interop.zip");
    std::fs::write(&path, &bytes).unwrap();

    let reader = StreamingZipReader::open(&path).unwrap();
    let names: Vec<_> = reader.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["assets/", "assets/hello.txt", "assets/data/big.bin"]);

    assert_eq!(reader.find_entry("assets/").unwrap().entry_type, EntryType::Directory);
    let big_entry = reader.find_entry("assets/data/big.bin").unwrap();
    assert_eq!(big_entry.compression_method, CompressionMethod::Deflate);
    assert_eq!(big_entry.uncompressed_size, big.len() as u64);

    assert_eq!(
        reader.read_entry_by_name("assets/hello.txt").unwrap(),
        b"hello from the zip crate"
    );
    assert_eq!(reader.read_entry(big_entry).unwrap(), big);
}

#[test]
fn extracts_archive_written_by_zip_crate() {
    let dir = tempdir().unwrap();
    let (bytes, big) = build_with_zip_crate();
    let path = dir.path().join("interop.zip");
    std::fs::write(&path, &bytes).unwrap();

    let dest = dir.path().join("out");
    std::fs::create_dir(&dest).unwrap();
    extract(&path, &dest).unwrap();

    assert!(dest.join("assets").is_dir());
    assert_eq!(
        std::fs::read(dest.join("assets/hello.txt")).unwrap(),
        b"hello from the zip crate"
    );
    assert_eq!(std::fs::read(dest.join("assets/data/big.bin")).unwrap(), big);
}
