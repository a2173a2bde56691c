use vofi::{Cell, Settings, get_cc, get_fh, shapes::EllipsoidCap};

fn cap() -> EllipsoidCap {
    EllipsoidCap::new(0.5, 0.4, 0.3, 0.6, [0.02, 0.9, -0.1])
}

/// Sums the color function over a grid of `n` cells of side `h` starting at
/// `x0`
fn volume(cap: &EllipsoidCap, x0: [f64; 3], n: [usize; 3], h: f64) -> f64 {
    let settings = Settings::default();
    let fh = get_fh(cap, &[0.5, 0.5, 0.5], h, true, &settings).unwrap();
    let mut total = 0.0;
    for i in 0..n[0] {
        for j in 0..n[1] {
            for k in 0..n[2] {
                let p = [
                    x0[0] + i as f64 * h,
                    x0[1] + j as f64 * h,
                    x0[2] + k as f64 * h,
                ];
                let cell = Cell::new(&p, h).unwrap();
                let cc = get_cc(cap, &cell, fh, &settings);
                assert!((0.0..=1.0).contains(&cc), "bad fraction {cc}");
                total += cc * cell.measure();
            }
        }
    }
    total
}

#[test]
fn two_cells() {
    // The cap straddles the face shared by two unit cells, and none of
    // their corners is inside it
    let cap = cap();
    let v = volume(&cap, [-1.0, 0.4, 0.0], [2, 1, 1], 1.0);
    let err = (v - cap.volume()).abs() / cap.volume();
    assert!(err < 1e-7, "volume {v} vs {}: error {err}", cap.volume());
}

#[test]
fn fine_grid() {
    let cap = cap();
    let v = volume(&cap, [-0.5, 0.4, 0.0], [8, 8, 4], 0.125);
    let err = (v - cap.volume()).abs() / cap.volume();
    assert!(err < 1e-4, "volume {v} vs {}: error {err}", cap.volume());
}
