/// Linearization convention for a 2-D (or higher) table flattened into a 1-D buffer.
///
/// Every function that marshals a buffer in or out of this crate takes one of these
/// explicitly. The native layering engine consumes and produces column-major buffers, while
/// the text formats are naturally written row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemoryOrder {
    /// "C" order: the last index varies fastest (`x0 y0 z0 x1 y1 z1 ...`).
    #[default]
    RowMajor,
    /// "F" order: the first index varies fastest (`x0 x1 ... y0 y1 ... z0 z1 ...`).
    ColumnMajor,
}

impl MemoryOrder {
    /// Position of element `(row, col)` of a `rows x cols` table stored in this order.
    #[inline]
    pub fn offset(self, row: usize, col: usize, rows: usize, cols: usize) -> usize {
        match self {
            MemoryOrder::RowMajor => row * cols + col,
            MemoryOrder::ColumnMajor => col * rows + row,
        }
    }
}

/// Copies a `rows x cols` table stored in `from` order into a new buffer in `to` order.
///
/// Panics if `data.len() != rows * cols`; callers validate lengths at the boundary.
pub fn reorder<T: Copy>(
    data: &[T],
    rows: usize,
    cols: usize,
    from: MemoryOrder,
    to: MemoryOrder,
) -> Vec<T> {
    assert_eq!(data.len(), rows * cols, "buffer does not match table shape");
    if from == to {
        return data.to_vec();
    }
    let mut out = Vec::with_capacity(data.len());
    match to {
        MemoryOrder::RowMajor => {
            for row in 0..rows {
                for col in 0..cols {
                    out.push(data[from.offset(row, col, rows, cols)]);
                }
            }
        }
        MemoryOrder::ColumnMajor => {
            for col in 0..cols {
                for row in 0..rows {
                    out.push(data[from.offset(row, col, rows, cols)]);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_to_column_major() {
        // 2 rows x 3 cols.
        let c = [1, 2, 3, 4, 5, 6];
        let f = reorder(&c, 2, 3, MemoryOrder::RowMajor, MemoryOrder::ColumnMajor);
        assert_eq!(vec![1, 4, 2, 5, 3, 6], f);
        let back = reorder(&f, 2, 3, MemoryOrder::ColumnMajor, MemoryOrder::RowMajor);
        assert_eq!(c.to_vec(), back);
    }

    #[test]
    fn same_order_is_a_copy() {
        let c = [1.0f32, 2.0, 3.0];
        assert_eq!(
            c.to_vec(),
            reorder(&c, 1, 3, MemoryOrder::ColumnMajor, MemoryOrder::ColumnMajor)
        );
    }
}
