mod common;

use common::Run;

use selfe::{Dataset, Dimension, Error};

use std::fs;

#[test]
fn header_and_grid() {
    let dir = tempfile::tempdir().unwrap();
    let run = Run::layered();
    let path = run.write_series(dir.path(), "hvel.64", &[1]).unwrap();

    let dataset = Dataset::open(&path, 3).unwrap();
    let header = dataset.header();

    assert_eq!(header.data_format.trimmed(), "DataFormat v5.0");
    assert_eq!(header.start_time.trimmed(), "2010-01-01 00:00");
    assert_eq!(header.nsteps, 3);
    assert_eq!(header.flag_sv, 2);
    assert_eq!(header.dimension, Dimension::Three);
    assert_eq!(header.nlevels, 4);
    assert_eq!(header.slevels.len(), 4);
    assert!(header.zlevels.is_empty());

    let mesh = dataset.mesh();
    assert_eq!(mesh.node_count(), 4);
    assert_eq!(mesh.element_count(), 2);
    assert_eq!(mesh.bottom_index, vec![1, 1, 3, 1]);
    assert_eq!(mesh.elements, vec![[0, 1, 2], [0, 2, 3]]);

    assert_eq!(dataset.path(), path.as_path());
    assert_eq!(dataset.file_count(), 3);
    let file_len = fs::metadata(&path).unwrap().len();
    assert_eq!(dataset.data_start(), file_len - (3 * dataset.record_bytes()) as u64);
    // 4 + 4 + 2 + 4 wet levels, two components
    assert_eq!(dataset.step_size(), 14);
    assert_eq!(dataset.record_bytes(), 4 * (2 + 4 + 14 * 2));
}

#[test]
fn zero_area_element() {
    let dir = tempfile::tempdir().unwrap();
    let mut run = Run::minimal();
    run.nodes[2] = [6., 0., 6.];
    let path = run.write_series(dir.path(), "elev.61", &[1]).unwrap();

    match Dataset::open(&path, 1) {
        Err(Error::DegenerateElement(inner)) => {
            assert_eq!(inner.element, 0);
            assert_eq!(inner.area, 0.);
        }
        other => panic!("expected a degenerate element, got {other:?}"),
    }
}

#[test]
fn clockwise_element() {
    let dir = tempfile::tempdir().unwrap();
    let mut run = Run::minimal();
    run.elements = vec![[1, 3, 2]];
    let path = run.write_series(dir.path(), "elev.61", &[1]).unwrap();

    assert!(matches!(
        Dataset::open(&path, 1),
        Err(Error::DegenerateElement(_))
    ));
}

#[test]
fn truncated_inside_the_grid() {
    let dir = tempfile::tempdir().unwrap();
    let run = Run::minimal();
    let mut bytes = Vec::new();
    run.write_preamble(&mut bytes).unwrap();
    bytes.truncate(bytes.len() - 6);

    let path = dir.path().join("1_elev.61");
    fs::write(&path, bytes).unwrap();

    match Dataset::open(&path, 1) {
        Err(Error::TruncatedHeader(inner)) => assert_eq!(inner.field, "elements"),
        other => panic!("expected a truncated header, got {other:?}"),
    }
}

#[test]
fn unknown_dimension_flag() {
    let dir = tempfile::tempdir().unwrap();
    let mut run = Run::minimal();
    run.flag_dm = 4;
    let path = run.write_series(dir.path(), "elev.61", &[1]).unwrap();

    assert!(matches!(
        Dataset::open(&path, 1),
        Err(Error::MalformedHeader(_))
    ));
}

#[test]
fn element_outside_the_nodes() {
    let dir = tempfile::tempdir().unwrap();
    let mut run = Run::minimal();
    run.elements = vec![[1, 2, 4]];
    let path = run.write_series(dir.path(), "elev.61", &[1]).unwrap();

    assert!(matches!(
        Dataset::open(&path, 1),
        Err(Error::MalformedHeader(_))
    ));
}

#[test]
fn missing_first_file() {
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        Dataset::open(dir.path().join("1_elev.61"), 1),
        Err(Error::Io(_))
    ));
}

/// byte offset of `nlevels` in a preamble
const NLEVELS_OFFSET: usize = 5 * common::TEXT_LEN + 5 * 4;

fn preamble_with(run: &Run, offset: usize, value: i32, keep: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    run.write_preamble(&mut bytes).unwrap();
    bytes[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
    bytes.truncate(keep);
    bytes
}

#[test]
fn huge_node_count_in_a_short_file() {
    let run = Run::minimal();
    // header, then np
    let np_offset = NLEVELS_OFFSET + 2 * 4 + 5 * 4 + run.nlevels * 4;
    let bytes = preamble_with(&run, np_offset, i32::MAX, np_offset + 8 + 16);

    match Dataset::from_reader(bytes.as_slice(), 1) {
        Err(Error::TruncatedHeader(inner)) => assert_eq!(inner.field, "nodes"),
        other => panic!("expected a truncated header, got {other:?}"),
    }
}

#[test]
fn huge_level_count_in_a_short_file() {
    let run = Run::minimal();
    let bytes = preamble_with(&run, NLEVELS_OFFSET, i32::MAX, NLEVELS_OFFSET + 40);

    match Dataset::from_reader(bytes.as_slice(), 1) {
        Err(Error::TruncatedHeader(inner)) => assert_eq!(inner.field, "slevels"),
        other => panic!("expected a truncated header, got {other:?}"),
    }
}
