use ragchunk_core::traits::TokenCounter;

/// Length function a splitter budgets against.
pub(crate) trait Measure {
    fn measure(&self, text: &str) -> usize;

    /// Byte length of the longest prefix of `text` measuring at most `budget`.
    fn fit_prefix(&self, text: &str, budget: usize) -> usize {
        if text.is_empty() { return 0; }
        let ends: Vec<usize> = text.char_indices().skip(1).map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        match fitting_count(ends.len(), |i| self.measure(&text[..ends[i]]) <= budget) {
            0 => 0,
            n => ends[n - 1],
        }
    }

    /// Byte offset where the longest suffix of `text` measuring at most `budget` starts.
    fn fit_suffix(&self, text: &str, budget: usize) -> usize {
        let starts: Vec<usize> = text.char_indices().rev().map(|(i, _)| i).collect();
        match fitting_count(starts.len(), |i| self.measure(&text[starts[i]..]) <= budget) {
            0 => text.len(),
            n => starts[n - 1],
        }
    }
}

pub(crate) struct CharMeasure;

impl Measure for CharMeasure {
    fn measure(&self, text: &str) -> usize { text.chars().count() }

    fn fit_prefix(&self, text: &str, budget: usize) -> usize {
        text.char_indices().nth(budget).map_or(text.len(), |(i, _)| i)
    }

    fn fit_suffix(&self, text: &str, budget: usize) -> usize {
        if budget == 0 { return text.len(); }
        text.char_indices().rev().nth(budget - 1).map_or(0, |(i, _)| i)
    }
}

pub(crate) struct TokenMeasure<'a>(pub &'a dyn TokenCounter);

impl Measure for TokenMeasure<'_> {
    fn measure(&self, text: &str) -> usize { self.0.count_tokens(text) }
}

/// Number of leading indices in `0..len` for which the monotone predicate holds.
///
/// Gallops forward before bisecting so short budgets over long texts only
/// measure short slices.
fn fitting_count(len: usize, fits: impl Fn(usize) -> bool) -> usize {
    let mut known = 0;
    let mut step = 1;
    while known < len {
        let probe = (known + step).min(len);
        if fits(probe - 1) {
            known = probe;
            step *= 2;
            continue;
        }
        let (mut lo, mut hi) = (known, probe - 1);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if fits(mid) { lo = mid + 1; } else { hi = mid; }
        }
        return lo;
    }
    len
}
