use lectern::{PageSize, Paginator};

fn numbered_lines(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("line {}", i)).collect()
}

fn paginator(page_size: usize, line_count: usize) -> Paginator {
    let mut paginator = Paginator::new(PageSize::new(page_size).expect("non-zero page size"));
    paginator.load_lines(numbered_lines(line_count));
    paginator
}

#[test]
fn test_page_size_rejects_zero() {
    assert!(PageSize::new(0).is_none());
    assert_eq!(PageSize::new(1).map(PageSize::get), Some(1));
    assert_eq!(PageSize::default().get(), 29);
}

#[test]
fn test_total_pages_matches_ceiling() {
    for page_size in 1..=7 {
        for line_count in 0..=30 {
            let p = paginator(page_size, line_count);
            let expected = line_count.div_ceil(page_size).max(1);
            assert_eq!(
                p.total_pages(),
                expected,
                "line_count={} page_size={}",
                line_count,
                page_size
            );
        }
    }
}

#[test]
fn test_go_to_always_lands_in_range() {
    let mut p = paginator(29, 87);
    for requested in [-100, -1, 0, 1, 2, 3, 4, 1000, i64::MAX, i64::MIN] {
        p.go_to(requested);
        assert!(p.page_index() < p.total_pages(), "requested {}", requested);
    }

    p.go_to(-5);
    assert_eq!(p.page_index(), 0);
    p.go_to(99);
    assert_eq!(p.page_index(), 2);
}

#[test]
fn test_go_to_current_page_is_idempotent() {
    let mut p = paginator(29, 87);
    p.go_to(1);
    let before = p.current_page_text();
    p.go_to(p.page_index() as i64);
    assert_eq!(p.page_index(), 1);
    assert_eq!(p.current_page_text(), before);
}

#[test]
fn test_middle_page_of_87_lines() {
    let mut p = paginator(29, 87);
    assert_eq!(p.total_pages(), 3);

    p.go_to(1);
    let expected: Vec<String> = (29..58).map(|i| format!("line {}", i)).collect();
    assert_eq!(p.current_page_lines().len(), 29);
    assert_eq!(p.current_page_text(), expected.join("\n"));
    assert_eq!(p.status_label(), "Page 2 of 3");
}

#[test]
fn test_last_page_is_partial() {
    let mut p = paginator(29, 60);
    p.last_page();
    assert_eq!(p.page_index(), 2);
    assert_eq!(p.current_page_lines(), &["line 58".to_string(), "line 59".to_string()]);
}

#[test]
fn test_empty_buffer_has_single_empty_page() {
    let mut p = paginator(29, 10);
    p.load_lines(Vec::new());
    assert_eq!(p.total_pages(), 1);
    assert_eq!(p.page_index(), 0);
    assert_eq!(p.current_page_text(), "");
    assert_eq!(p.status_label(), "Page 1 of 1");
}

#[test]
fn test_previous_and_next_saturate() {
    let mut p = paginator(10, 25);

    for _ in 0..5 {
        p.previous_page();
    }
    assert_eq!(p.page_index(), 0);

    for _ in 0..10 {
        p.next_page();
    }
    assert_eq!(p.page_index(), 2);
    assert_eq!(p.status_label(), "Page 3 of 3");
}

#[test]
fn test_load_lines_resets_page() {
    let mut p = paginator(10, 50);
    p.go_to(3);
    p.load_lines(numbered_lines(5));
    assert_eq!(p.page_index(), 0);
    assert_eq!(p.line_count(), 5);
}

#[test]
fn test_page_for_line() {
    let p = paginator(29, 87);
    assert_eq!(p.page_for_line(0), 0);
    assert_eq!(p.page_for_line(28), 0);
    assert_eq!(p.page_for_line(29), 1);
    assert_eq!(p.page_for_line(86), 2);
    assert_eq!(p.page_for_line(10_000), 2);
}
