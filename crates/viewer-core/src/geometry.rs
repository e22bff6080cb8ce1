//! Rectangle helpers for selection geometry.

use doc_model::Rect;
use std::cmp::Ordering;

/// Vertical tolerance for two rects to be considered on the same text line.
const SAME_LINE_MARGIN: f64 = 5.0;

/// Maximum horizontal gap bridged when merging neighbouring rects.
const NEXT_TO_MARGIN: f64 = 10.0;

const MERGE_PASSES: usize = 3;

/// Union of the rects lying on the first (lowest-numbered) page.
///
/// Rects without a page number only participate when none of the rects carry
/// one. Rects collapsed onto the origin are ignored. Returns `None` when no
/// rect qualifies.
pub fn bounding_rect(rects: &[Rect]) -> Option<Rect> {
    let first_page = rects.iter().filter_map(|rect| rect.page_number).min();

    let mut candidates = rects.iter().filter(|rect| {
        let has_extent =
            rect.left > 0.0 || rect.right() > 0.0 || rect.top > 0.0 || rect.bottom() > 0.0;
        has_extent && rect.page_number == first_page
    });

    let first = candidates.next()?;
    let (mut x0, mut y0, mut x1, mut y1) = (first.left, first.top, first.right(), first.bottom());

    for rect in candidates {
        x0 = x0.min(rect.left);
        y0 = y0.min(rect.top);
        x1 = x1.max(rect.right());
        y1 = y1.max(rect.bottom());
    }

    Some(Rect {
        left: x0,
        top: y0,
        width: x1 - x0,
        height: y1 - y0,
        page_number: first_page,
    })
}

fn compare_reading_order(a: &Rect, b: &Rect) -> Ordering {
    a.page_number
        .cmp(&b.page_number)
        .then_with(|| a.top.total_cmp(&b.top))
        .then_with(|| a.left.total_cmp(&b.left))
}

fn same_line(a: &Rect, b: &Rect) -> bool {
    a.page_number == b.page_number
        && (a.top - b.top).abs() < SAME_LINE_MARGIN
        && (a.height - b.height).abs() < SAME_LINE_MARGIN
}

fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.page_number == b.page_number && a.left <= b.left && b.left <= a.right()
}

fn next_to(a: &Rect, b: &Rect) -> bool {
    a.page_number == b.page_number
        && a.left <= b.left
        && a.right() <= b.right()
        && b.left - a.right() <= NEXT_TO_MARGIN
}

/// Strict containment of `a` within `b`.
fn inside(a: &Rect, b: &Rect) -> bool {
    a.page_number == b.page_number
        && a.top > b.top
        && a.left > b.left
        && a.bottom() < b.bottom()
        && a.right() < b.right()
}

fn extend_width(a: &mut Rect, b: &Rect) {
    a.width = (b.width - a.left + b.left).max(a.width);
}

/// Collapse the raw client rects of a text range into one rect per line run.
///
/// Text layers typically yield one rect per glyph span, with nested and
/// overlapping boxes. Rects fully inside another are dropped, then same-line
/// rects that overlap or sit next to each other are merged. The result is in
/// reading order (page, top, left).
pub fn optimize_client_rects(mut rects: Vec<Rect>) -> Vec<Rect> {
    rects.sort_by(compare_reading_order);

    let mut kept: Vec<Rect> = rects
        .iter()
        .filter(|rect| !rects.iter().any(|other| inside(rect, other)))
        .copied()
        .collect();
    let mut removed = vec![false; kept.len()];

    for _ in 0..MERGE_PASSES {
        for a in 0..kept.len() {
            for b in 0..kept.len() {
                if a == b || removed[a] || removed[b] {
                    continue;
                }

                let other = kept[b];
                if !same_line(&kept[a], &other) {
                    continue;
                }

                if overlaps(&kept[a], &other) {
                    extend_width(&mut kept[a], &other);
                    kept[a].height = kept[a].height.max(other.height);
                    removed[b] = true;
                } else if next_to(&kept[a], &other) {
                    extend_width(&mut kept[a], &other);
                    removed[b] = true;
                }
            }
        }
    }

    kept.into_iter().zip(removed).filter_map(|(rect, gone)| (!gone).then_some(rect)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_rect_anchors_to_first_page() {
        let rects = vec![
            Rect::new(50.0, 900.0, 200.0, 20.0).on_page(1),
            Rect::new(40.0, 940.0, 100.0, 20.0).on_page(1),
            Rect::new(10.0, 10.0, 300.0, 20.0).on_page(2),
        ];

        let bounds = bounding_rect(&rects).expect("bounding rect expected");
        assert_eq!(bounds, Rect::new(40.0, 900.0, 210.0, 60.0).on_page(1));
    }

    #[test]
    fn bounding_rect_of_nothing_is_none() {
        assert!(bounding_rect(&[]).is_none());
        assert!(bounding_rect(&[Rect::new(0.0, 0.0, 0.0, 0.0).on_page(1)]).is_none());
    }

    #[test]
    fn bounding_rect_without_page_numbers() {
        let rects = vec![Rect::new(5.0, 5.0, 10.0, 10.0), Rect::new(20.0, 0.0, 5.0, 5.0)];
        let bounds = bounding_rect(&rects).expect("bounding rect expected");
        assert_eq!(bounds, Rect::new(5.0, 0.0, 20.0, 15.0));
    }

    #[test]
    fn nested_rects_are_dropped() {
        let outer = Rect::new(10.0, 10.0, 100.0, 20.0).on_page(1);
        let inner = Rect::new(20.0, 12.0, 10.0, 10.0).on_page(1);

        let optimized = optimize_client_rects(vec![inner, outer]);
        assert_eq!(optimized, vec![outer]);
    }

    #[test]
    fn same_line_neighbours_are_merged() {
        let words = vec![
            Rect::new(100.0, 50.0, 40.0, 12.0).on_page(1),
            Rect::new(10.0, 50.0, 50.0, 12.0).on_page(1),
            Rect::new(65.0, 51.0, 30.0, 12.0).on_page(1),
        ];

        let optimized = optimize_client_rects(words);
        assert_eq!(optimized.len(), 1);
        assert_eq!(optimized[0].left, 10.0);
        assert_eq!(optimized[0].right(), 140.0);
    }

    #[test]
    fn separate_lines_and_pages_stay_separate() {
        let rects = vec![
            Rect::new(10.0, 80.0, 50.0, 12.0).on_page(1),
            Rect::new(10.0, 50.0, 50.0, 12.0).on_page(1),
            Rect::new(10.0, 50.0, 50.0, 12.0).on_page(2),
        ];

        let optimized = optimize_client_rects(rects);
        assert_eq!(optimized.len(), 3);
        assert_eq!(optimized[0].top, 50.0);
        assert_eq!(optimized[1].top, 80.0);
        assert_eq!(optimized[2].page_number, Some(2));
    }

    #[test]
    fn distant_words_on_one_line_are_not_bridged() {
        let rects = vec![
            Rect::new(10.0, 50.0, 20.0, 12.0).on_page(1),
            Rect::new(200.0, 50.0, 20.0, 12.0).on_page(1),
        ];

        assert_eq!(optimize_client_rects(rects).len(), 2);
    }
}
