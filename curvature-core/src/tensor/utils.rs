/// Calculates contiguous (row-major) strides for a given shape.
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    if shape.is_empty() {
        return strides;
    }
    let mut current_stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = current_stride;
        current_stride *= shape[i];
    }
    strides
}

/// Converts a flat row-major index into coordinates.
pub fn index_to_coord(index: usize, shape: &[usize]) -> Vec<usize> {
    let mut coord = vec![0; shape.len()];
    let mut rem = index;
    for dim in (0..shape.len()).rev() {
        if shape[dim] > 0 {
            coord[dim] = rem % shape[dim];
            rem /= shape[dim];
        }
    }
    coord
}

/// Converts coordinates into a flat row-major index.
pub fn coord_to_index(coord: &[usize], shape: &[usize]) -> usize {
    calculate_strides(shape)
        .iter()
        .zip(coord.iter())
        .map(|(stride, c)| stride * c)
        .sum()
}

/// Splits `shape` around `dim` into `(outer, size, inner)` element counts.
///
/// Every axis-wise op (sum, expand, index selection, stacking) walks a
/// contiguous buffer as `outer` blocks of `size` slices of `inner` elements.
pub(crate) fn split_at_dim(shape: &[usize], dim: usize) -> (usize, usize, usize) {
    let outer = shape[..dim].iter().product();
    let size = shape[dim];
    let inner = shape[dim + 1..].iter().product();
    (outer, size, inner)
}

#[cfg(test)]
#[path = "utils_test.rs"]
mod tests;
