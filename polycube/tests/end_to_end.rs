//! End-to-end scenarios from spec.md §8.

use polycube::archive::{self, Compression, Orientation};
use polycube::dispatch::{NullSink, Runtime};
use polycube::expand::is_connected;
use polycube::grid::Grid;
use polycube::tier::generate_with;
use std::path::PathBuf;

fn tmp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("polycube-e2e-{tag}"));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn scenario_1_generate_one() {
    let runtime = Runtime::new(false).unwrap();
    let grids = generate_with(1, false, &tmp_dir("s1"), &runtime, &NullSink).unwrap();
    assert_eq!(grids.len(), 1);
    assert_eq!(grids[0].shape(), (1, 1, 1));
    assert!(grids[0].get(0, 0, 0));
}

#[test]
fn scenario_2_generate_two() {
    let runtime = Runtime::new(false).unwrap();
    let grids = generate_with(2, false, &tmp_dir("s2"), &runtime, &NullSink).unwrap();
    assert_eq!(grids.len(), 1);
    assert_eq!(grids[0].shape(), (2, 1, 1));
    assert!(grids[0].get(0, 0, 0) && grids[0].get(1, 0, 0));
}

#[test]
fn scenario_3_generate_three_has_straight_and_l_tromino() {
    let runtime = Runtime::new(false).unwrap();
    let grids = generate_with(3, false, &tmp_dir("s3"), &runtime, &NullSink).unwrap();
    assert_eq!(grids.len(), 2);

    let has_straight = grids.iter().any(|g| g.shape() == (3, 1, 1));
    let has_l = grids
        .iter()
        .any(|g| g.shape() == (2, 2, 1) && g.count_ones() == 3);
    assert!(has_straight, "expected the straight 3x1x1 tromino");
    assert!(has_l, "expected the L-tromino in a 2x2x1 box");
}

#[test]
fn scenario_4_generate_four_has_eight_tetracubes() {
    let runtime = Runtime::new(false).unwrap();
    let grids = generate_with(4, false, &tmp_dir("s4"), &runtime, &NullSink).unwrap();
    assert_eq!(grids.len(), 8);
    for g in &grids {
        assert_eq!(g.count_ones(), 4);
        assert!(is_connected(g));
    }
}

#[test]
fn scenario_5_generate_five_has_29() {
    let runtime = Runtime::new(false).unwrap();
    let grids = generate_with(5, false, &tmp_dir("s5"), &runtime, &NullSink).unwrap();
    assert_eq!(grids.len(), 29);
}

#[test]
fn scenario_6_archive_roundtrip_with_gzip() {
    let runtime = Runtime::new(false).unwrap();
    let grids = generate_with(4, false, &tmp_dir("s6"), &runtime, &NullSink).unwrap();
    let ids: Vec<_> = grids.iter().map(Grid::pack).collect();

    let mut buf = Vec::new();
    archive::write_pcube(&mut buf, &ids, Orientation::Oriented, Compression::Gzip).unwrap();
    let (_, back) = archive::read_pcube(&mut &buf[..]).unwrap();

    let mut expected = ids.clone();
    let mut actual = back;
    expected.sort();
    actual.sort();
    assert_eq!(expected, actual);
}

#[test]
fn every_polycube_p2_roundtrips_through_pack_unpack() {
    let runtime = Runtime::new(false).unwrap();
    let grids = generate_with(5, false, &tmp_dir("p2"), &runtime, &NullSink).unwrap();
    for g in &grids {
        let back = g.pack().unpack().unwrap();
        assert_eq!(*g, back);
    }
}

#[test]
fn every_polycube_p7_is_connected() {
    let runtime = Runtime::new(false).unwrap();
    let grids = generate_with(5, false, &tmp_dir("p7"), &runtime, &NullSink).unwrap();
    for g in &grids {
        assert!(is_connected(g));
    }
}
