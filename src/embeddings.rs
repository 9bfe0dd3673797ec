//! Precomputed embedding tables.
//!
//! Every head wraps one or two tables: a node (entity) table and, for the
//! translational heads, a relation table. A table is a rank-2 `f32` tensor
//! of shape `(rows, dim)` where row `i` is the embedding of id `i`.
//!
//! Training happens elsewhere (PyKEEN, PyG, a candle training loop); the
//! table only needs to be loaded into a [`Tensor`] on some device.

use crate::error::{Error, Result};
use candle_core::{DType, Device, Tensor};
use std::fmt;

/// Which vocabulary a table embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingKind {
    /// Graph nodes / entities.
    Node,
    /// Edge types / relations.
    Relation,
}

impl EmbeddingKind {
    /// Lowercase name used in errors and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Relation => "relation",
        }
    }
}

impl fmt::Display for EmbeddingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated `(rows, dim)` embedding matrix.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    tensor: Tensor,
    kind: EmbeddingKind,
    rows: usize,
    dim: usize,
}

impl EmbeddingTable {
    /// Wrap an existing tensor.
    ///
    /// The tensor must be rank 2 with a non-zero embedding dimension.
    /// Float tensors of other precisions are converted to `f32`.
    pub fn new(tensor: Tensor, kind: EmbeddingKind) -> Result<Self> {
        if tensor.rank() != 2 {
            return Err(Error::InvalidConfig(format!(
                "{kind} embeddings must be rank 2 (rows, dim), got shape {:?}",
                tensor.dims()
            )));
        }
        if !tensor.dtype().is_float() {
            return Err(Error::InvalidConfig(format!(
                "{kind} embeddings must be a float tensor, got {:?}",
                tensor.dtype()
            )));
        }
        let tensor = if tensor.dtype() == DType::F32 {
            tensor
        } else {
            tensor.to_dtype(DType::F32)?
        };
        let (rows, dim) = tensor.dims2()?;
        if dim == 0 {
            return Err(Error::InvalidConfig(format!(
                "{kind} embeddings have zero dimension"
            )));
        }
        Ok(Self {
            tensor,
            kind,
            rows,
            dim,
        })
    }

    /// Build from a flat row-major slice.
    pub fn from_vecs(
        data: &[f32],
        rows: usize,
        dim: usize,
        kind: EmbeddingKind,
        device: &Device,
    ) -> Result<Self> {
        if data.len() != rows * dim {
            return Err(Error::DimensionMismatch {
                expected: rows * dim,
                got: data.len(),
            });
        }
        let tensor = Tensor::from_slice(data, (rows, dim), device)?;
        Self::new(tensor, kind)
    }

    /// Build from one vector per row. All rows must share a dimension.
    pub fn from_rows(rows: &[Vec<f32>], kind: EmbeddingKind, device: &Device) -> Result<Self> {
        let dim = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut flat = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            if row.len() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    got: row.len(),
                });
            }
            flat.extend_from_slice(row);
        }
        Self::from_vecs(&flat, rows.len(), dim, kind, device)
    }

    /// Embedding of a single id, shape `(dim,)`.
    pub fn row(&self, id: usize) -> Result<Tensor> {
        self.check_id(id)?;
        Ok(self.tensor.get(id)?)
    }

    /// Embeddings of several ids, shape `(ids.len(), dim)`.
    pub fn rows(&self, ids: &[usize]) -> Result<Tensor> {
        let mut index = Vec::with_capacity(ids.len());
        for &id in ids {
            self.check_id(id)?;
            index.push(id as u32);
        }
        let index = Tensor::from_vec(index, ids.len(), self.tensor.device())?;
        Ok(self.tensor.index_select(&index, 0)?)
    }

    /// Fail unless `other` embeds into the same space.
    pub fn check_compatible(&self, other: &EmbeddingTable) -> Result<()> {
        if self.dim != other.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                got: other.dim,
            });
        }
        Ok(())
    }

    fn check_id(&self, id: usize) -> Result<()> {
        if id >= self.rows {
            return Err(Error::IndexOutOfRange {
                kind: self.kind.as_str(),
                index: id,
                len: self.rows,
            });
        }
        Ok(())
    }

    /// Number of rows (ids).
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Embedding dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The underlying `(rows, dim)` tensor.
    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    /// Device the table lives on.
    pub fn device(&self) -> &Device {
        self.tensor.device()
    }

    /// Which vocabulary the table embeds.
    pub fn kind(&self) -> EmbeddingKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> EmbeddingTable {
        EmbeddingTable::from_rows(
            &[vec![1.0, 0.0], vec![0.0, 1.0], vec![2.0, 3.0]],
            EmbeddingKind::Node,
            &Device::Cpu,
        )
        .unwrap()
    }

    #[test]
    fn test_from_rows_shape() {
        let t = table();
        assert_eq!(t.len(), 3);
        assert_eq!(t.dim(), 2);
        assert!(!t.is_empty());
        assert_eq!(t.kind(), EmbeddingKind::Node);
    }

    #[test]
    fn test_row_lookup() {
        let t = table();
        let row = t.row(2).unwrap().to_vec1::<f32>().unwrap();
        assert_eq!(row, vec![2.0, 3.0]);
    }

    #[test]
    fn test_row_out_of_range() {
        let t = table();
        match t.row(3) {
            Err(Error::IndexOutOfRange { kind, index, len }) => {
                assert_eq!(kind, "node");
                assert_eq!(index, 3);
                assert_eq!(len, 3);
            }
            other => panic!("expected IndexOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_rows_gather() {
        let t = table();
        let rows = t.rows(&[2, 0]).unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(rows, vec![vec![2.0, 3.0], vec![1.0, 0.0]]);
        assert!(t.rows(&[0, 7]).is_err());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = EmbeddingTable::from_rows(
            &[vec![1.0, 0.0], vec![1.0]],
            EmbeddingKind::Relation,
            &Device::Cpu,
        );
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_flat_length_checked() {
        let result =
            EmbeddingTable::from_vecs(&[1.0, 2.0, 3.0], 2, 2, EmbeddingKind::Node, &Device::Cpu);
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_rank_checked() {
        let t = Tensor::new(&[1.0f32, 2.0, 3.0], &Device::Cpu).unwrap();
        assert!(matches!(
            EmbeddingTable::new(t, EmbeddingKind::Node),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_f64_converted() {
        let t = Tensor::new(&[[1.0f64, 2.0], [3.0, 4.0]], &Device::Cpu).unwrap();
        let table = EmbeddingTable::new(t, EmbeddingKind::Node).unwrap();
        assert_eq!(table.tensor().dtype(), DType::F32);
    }

    #[test]
    fn test_integer_rejected() {
        let t = Tensor::new(&[[1u32, 2], [3, 4]], &Device::Cpu).unwrap();
        assert!(EmbeddingTable::new(t, EmbeddingKind::Node).is_err());
    }

    #[test]
    fn test_compatibility() {
        let nodes = table();
        let rels =
            EmbeddingTable::from_rows(&[vec![0.5, 0.5, 0.5]], EmbeddingKind::Relation, &Device::Cpu)
                .unwrap();
        assert!(nodes.check_compatible(&rels).is_err());
        assert!(nodes.check_compatible(&nodes).is_ok());
    }
}
