//! Golden outputs for the neighborhood filters.
//!
//! The expected bytes are fixed, so running this suite with and without
//! `--features parallel` checks that both row drivers produce identical
//! results.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pixlab_engine::{PixelBuffer, apply_blur, apply_sharpen, detect_edges};

#[allow(clippy::cast_possible_truncation)]
fn pattern(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        [
            (x * 37 + y * 11) as u8,
            (x * 5 + y * 71) as u8,
            (x * y * 13 + 7) as u8,
            255,
        ]
    })
    .unwrap()
}

fn assert_rgb(buffer: &PixelBuffer, expected: &[[u8; 3]]) {
    assert_eq!(buffer.pixel_count(), expected.len());
    for (i, (px, want)) in buffer.pixels().zip(expected).enumerate() {
        assert_eq!(&px[..3], want, "pixel {i}");
        assert_eq!(px[3], 255, "alpha at pixel {i}");
    }
}

/// Order-sensitive hash of every byte.
fn digest(buffer: &PixelBuffer) -> u64 {
    buffer.as_bytes().iter().enumerate().fold(0, |acc, (i, &b)| {
        acc.wrapping_mul(31).wrapping_add(u64::from(b) ^ i as u64)
    })
}

const BLUR_R1: [[u8; 3]; 48] = [
    [24, 38, 10], [42, 40, 14], [80, 46, 20], [116, 50, 26], [154, 56, 33],
    [190, 60, 40], [142, 66, 46], [118, 68, 49], [30, 74, 14], [48, 76, 20],
    [85, 81, 33], [122, 86, 46], [159, 91, 59], [196, 96, 72], [148, 101, 85],
    [124, 104, 92], [40, 144, 20], [59, 147, 33], [96, 152, 59], [133, 157, 85],
    [170, 162, 111], [207, 167, 137], [159, 172, 135], [134, 174, 133], [52, 130, 26],
    [70, 133, 46], [107, 138, 85], [144, 143, 124], [181, 148, 135], [190, 153, 145],
    [141, 158, 127], [103, 160, 132], [62, 116, 33], [81, 118, 59], [118, 123, 111],
    [155, 128, 135], [192, 133, 130], [172, 138, 125], [124, 143, 120], [71, 146, 132],
    [68, 66, 36], [86, 68, 66], [124, 74, 124], [160, 78, 140], [198, 84, 113],
    [149, 88, 86], [101, 94, 102], [34, 96, 131],
];

const SHARPEN: [[u8; 3]; 48] = [
    [0, 0, 7], [37, 5, 7], [74, 10, 7], [111, 15, 7], [148, 20, 7],
    [185, 25, 7], [222, 30, 7], [3, 35, 7], [11, 71, 7], [48, 76, 20],
    [85, 81, 33], [122, 86, 46], [159, 91, 59], [196, 96, 72], [255, 101, 85],
    [14, 106, 98], [22, 142, 7], [59, 147, 33], [96, 152, 59], [133, 157, 85],
    [170, 162, 111], [207, 167, 137], [255, 172, 163], [25, 177, 189], [33, 213, 7],
    [70, 255, 46], [107, 255, 85], [144, 255, 124], [181, 255, 163], [218, 255, 255],
    [255, 255, 255], [36, 248, 24], [44, 28, 7], [81, 0, 59], [118, 0, 111],
    [155, 0, 163], [192, 0, 255], [255, 0, 0], [0, 0, 0], [47, 63, 115],
    [55, 99, 7], [92, 104, 72], [129, 109, 137], [166, 114, 202], [203, 119, 11],
    [240, 124, 76], [21, 129, 141], [58, 134, 206],
];

const EDGES: [[u8; 3]; 48] = [
    [0, 0, 7], [37, 5, 7], [74, 10, 7], [111, 15, 7], [148, 20, 7],
    [185, 25, 7], [222, 30, 7], [3, 35, 7], [11, 71, 7], [255, 255, 255],
    [255, 255, 255], [255, 255, 255], [255, 255, 255], [255, 255, 255], [255, 255, 255],
    [14, 106, 98], [22, 142, 7], [255, 255, 255], [255, 255, 255], [255, 255, 255],
    [255, 255, 255], [255, 255, 255], [255, 255, 255], [25, 177, 189], [33, 213, 7],
    [255, 255, 255], [255, 255, 255], [253, 253, 253], [253, 253, 253], [255, 255, 255],
    [255, 255, 255], [36, 248, 24], [44, 28, 7], [255, 255, 255], [255, 255, 255],
    [255, 255, 255], [255, 255, 255], [255, 255, 255], [255, 255, 255], [47, 63, 115],
    [55, 99, 7], [92, 104, 72], [129, 109, 137], [166, 114, 202], [203, 119, 11],
    [240, 124, 76], [21, 129, 141], [58, 134, 206],
];

#[test]
fn blur_radius_one_matches_golden() {
    let mut buffer = pattern(8, 6);
    apply_blur(&mut buffer, 1);
    assert_rgb(&buffer, &BLUR_R1);
}

#[test]
fn sharpen_matches_golden() {
    let mut buffer = pattern(8, 6);
    apply_sharpen(&mut buffer);
    assert_rgb(&buffer, &SHARPEN);
}

#[test]
fn edges_match_golden() {
    let mut buffer = pattern(8, 6);
    detect_edges(&mut buffer);
    assert_rgb(&buffer, &EDGES);
}

#[test]
fn large_buffer_digests_are_stable() {
    let source = pattern(64, 48);

    let mut blurred = source.clone();
    apply_blur(&mut blurred, 2);
    assert_eq!(digest(&blurred), 9605140870755694099);

    let mut sharpened = source.clone();
    apply_sharpen(&mut sharpened);
    assert_eq!(digest(&sharpened), 2818512097067731100);

    let mut edges = source;
    detect_edges(&mut edges);
    assert_eq!(digest(&edges), 6541321754873362519);
}
