//! Ordered, non-contiguous subsequence containment.

/// True iff every element of `needle` appears in `hay` in the same
/// relative order, not necessarily contiguously. Greedy two-pointer scan.
pub fn is_subsequence<T: PartialEq>(needle: &[T], hay: &[T]) -> bool {
    let mut matched = 0;
    for item in hay {
        if matched == needle.len() {
            break;
        }
        if *item == needle[matched] {
            matched += 1;
        }
    }
    matched == needle.len()
}
