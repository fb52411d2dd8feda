use bwgraph::{
    constants::GRAPH_HEIGHT,
    ui::{bar_heights, scale_max},
    util::size_label,
    BandwidthSample, ColorMap, SampleWindow, Surface,
};
use proptest::prelude::*;
use ratatui::{backend::TestBackend, style::Modifier};

// Label back to a byte count, rounded down to its tenth
fn label_value(label: &str) -> u128 {
    let (number, unit) = label.split_once(' ').unwrap();
    let (whole, tenth) = number.split_once('.').unwrap();
    let tenths: u128 = whole.parse::<u128>().unwrap() * 10 + tenth.parse::<u128>().unwrap();
    let power = ["B", "KB", "MB", "GB", "TB", "PB", "EB"]
        .iter()
        .position(|u| *u == unit)
        .unwrap();
    tenths * (1u128 << (10 * power)) / 10
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn window_keeps_newest_capacity_samples(values in prop::collection::vec(any::<(u64, u64)>(), 0..100)) {
        let mut window = SampleWindow::new();
        for &(down, up) in &values {
            window.push(BandwidthSample::new(down, up));
            prop_assert_eq!(window.latest(), Some(&BandwidthSample::new(down, up)));
        }
        prop_assert_eq!(window.len(), values.len().min(SampleWindow::CAPACITY));
    }

    #[test]
    fn bar_heights_stay_in_graph(values in prop::collection::vec(any::<u64>(), 0..=40)) {
        let max = scale_max(&values);
        for (value, height) in values.iter().zip(bar_heights(&values)) {
            prop_assert!(height <= GRAPH_HEIGHT);
            prop_assert_eq!(height == GRAPH_HEIGHT, *value == max && *value > 0);
        }
    }

    #[test]
    fn zero_windows_have_no_bars(len in 0usize..=40) {
        prop_assert!(bar_heights(&vec![0; len]).iter().all(|&h| h == 0));
    }

    #[test]
    fn size_labels_are_monotonic(a in any::<u64>(), b in any::<u64>()) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(label_value(&size_label(low)) <= label_value(&size_label(high)));
        prop_assert!(label_value(&size_label(low)) <= u128::from(low));
    }

    #[test]
    fn add_text_stays_in_viewport(
        width in 1u16..30,
        height in 1u16..6,
        row in 0u16..10,
        col in 0u16..40,
        text in "[a-z]{0,50}",
    ) {
        let mut surface = Surface::new(TestBackend::new(width, height), ColorMap::full()).unwrap();
        surface.add_text(row, col, &text, Some("cyan"), Modifier::BOLD).unwrap();
        surface.present();

        let buffer = surface.backend().buffer();
        prop_assert_eq!(buffer.area.width, width);
        prop_assert_eq!(buffer.area.height, height);
        for y in 0..height {
            for x in 0..width {
                let written = buffer.get(x, y).symbol() != " ";
                let expected = y == row
                    && x >= col
                    && usize::from(x - col) < text.len();
                prop_assert_eq!(written, expected, "cell ({}, {})", x, y);
            }
        }
    }
}
