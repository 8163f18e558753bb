use num_traits::{AsPrimitive, Float};

/// Returns `start, start + step, ...` up to but excluding `stop`.
///
/// The node count is `ceil((stop - start) / step)`, which is zero when
/// `stop <= start`.
pub fn arange<T>(start: T, stop: T, step: T) -> impl Iterator<Item = T>
where
    T: Float + 'static,
    usize: AsPrimitive<T>,
{
    let n = ((stop - start) / step).ceil().to_usize().unwrap_or(0);
    (0..n).map(move |i| start + i.as_() * step)
}
