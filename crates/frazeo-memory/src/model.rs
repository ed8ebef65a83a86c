use frazeo_core::{FrazeoError, FrazeoResult};
use ndarray::{Array1, Array2, Axis};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

fn default_unknown() -> String {
    "<unk>".to_string()
}

/// On-disk layout of the embedding model (JSON).
///
/// Matrices are row-major nested arrays. `u_rank` is `vocab × r`, `vh_rank`
/// is `r × d`, `inverse` is `d × out`.
#[derive(Debug, Clone, Deserialize)]
pub struct SvdModelFile {
    /// Piece -> vocabulary index.
    pub map: HashMap<String, usize>,
    /// Inverse document frequency per vocabulary index.
    pub idf: Vec<f64>,
    /// Left singular factors, one row per vocabulary index.
    pub u_rank: Vec<Vec<f64>>,
    /// Singular values.
    pub s_rank: Vec<f64>,
    /// Right singular factors.
    pub vh_rank: Vec<Vec<f64>>,
    /// Learned bias added after the low-rank projection.
    pub bias: Vec<f64>,
    /// Learned inverse/whitening matrix applied last.
    pub inverse: Vec<Vec<f64>>,
    /// Piece that unknown pieces map to.
    #[serde(default = "default_unknown")]
    pub unknown: String,
}

/// Truncated-SVD text model mapping IDF-weighted pieces into the index space.
pub struct SvdModel {
    vocab: HashMap<String, usize>,
    unknown: usize,
    idf: Array1<f64>,
    u_rank: Array2<f64>,
    s_rank: Array1<f64>,
    vh_rank: Array2<f64>,
    bias: Array1<f64>,
    inverse: Array2<f64>,
}

fn to_matrix(name: &str, rows: Vec<Vec<f64>>) -> FrazeoResult<Array2<f64>> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if nrows == 0 || ncols == 0 {
        return Err(FrazeoError::Model(format!("'{name}' is empty")));
    }
    let mut flat = Vec::with_capacity(nrows * ncols);
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != ncols {
            return Err(FrazeoError::Model(format!(
                "'{name}' row {i} has {} columns, expected {ncols}",
                row.len()
            )));
        }
        flat.extend(row);
    }
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| FrazeoError::Model(format!("'{name}' has an invalid shape: {e}")))
}

fn check_len(name: &str, actual: usize, expected: usize) -> FrazeoResult<()> {
    if actual != expected {
        return Err(FrazeoError::Model(format!(
            "'{name}' has length {actual}, expected {expected}"
        )));
    }
    Ok(())
}

impl SvdModel {
    /// Load and validate a model from a JSON file.
    pub fn load(path: &Path) -> FrazeoResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            FrazeoError::Model(format!("Failed to read model '{}': {e}", path.display()))
        })?;
        let file: SvdModelFile = serde_json::from_str(&data).map_err(|e| {
            FrazeoError::Model(format!("Failed to parse model '{}': {e}", path.display()))
        })?;
        let model = Self::from_file(file)?;
        tracing::info!(
            path = %path.display(),
            vocab = model.vocab_size(),
            rank = model.rank(),
            dimension = model.output_dim(),
            "Embedding model loaded"
        );
        Ok(model)
    }

    /// Validate shapes and build the model.
    pub fn from_file(file: SvdModelFile) -> FrazeoResult<Self> {
        let vocab_size = file.idf.len();
        if vocab_size == 0 {
            return Err(FrazeoError::Model("'idf' is empty".into()));
        }
        if let Some((piece, idx)) = file.map.iter().find(|(_, idx)| **idx >= vocab_size) {
            return Err(FrazeoError::Model(format!(
                "piece '{piece}' maps to index {idx}, vocabulary has {vocab_size}"
            )));
        }
        let unknown = *file.map.get(&file.unknown).ok_or_else(|| {
            FrazeoError::Model(format!("unknown piece '{}' missing from map", file.unknown))
        })?;

        let u_rank = to_matrix("u_rank", file.u_rank)?;
        let vh_rank = to_matrix("vh_rank", file.vh_rank)?;
        let inverse = to_matrix("inverse", file.inverse)?;
        let rank = u_rank.ncols();
        let dense = vh_rank.ncols();

        check_len("u_rank rows", u_rank.nrows(), vocab_size)?;
        check_len("s_rank", file.s_rank.len(), rank)?;
        check_len("vh_rank rows", vh_rank.nrows(), rank)?;
        check_len("bias", file.bias.len(), dense)?;
        check_len("inverse rows", inverse.nrows(), dense)?;

        Ok(Self {
            vocab: file.map,
            unknown,
            idf: Array1::from(file.idf),
            u_rank,
            s_rank: Array1::from(file.s_rank),
            vh_rank,
            bias: Array1::from(file.bias),
            inverse,
        })
    }

    /// Vocabulary index of a piece, or the unknown index.
    pub fn vocab_index(&self, piece: &str) -> usize {
        self.vocab.get(piece).copied().unwrap_or(self.unknown)
    }

    /// The reserved unknown index.
    pub fn unknown_index(&self) -> usize {
        self.unknown
    }

    /// Number of vocabulary entries.
    pub fn vocab_size(&self) -> usize {
        self.idf.len()
    }

    /// Rank of the truncated SVD.
    pub fn rank(&self) -> usize {
        self.u_rank.ncols()
    }

    /// Dimensionality of projected vectors.
    pub fn output_dim(&self) -> usize {
        self.inverse.ncols()
    }

    /// Project resolved vocabulary indices into the output space:
    /// `normalize(idf[idx]) · U[idx] · diag(s) · Vh + bias`, then `· inverse`.
    ///
    /// A zero weight vector (no pieces, or only zero-IDF pieces) contributes
    /// nothing, so the result collapses to `bias · inverse`.
    pub fn project(&self, indices: &[usize]) -> Array1<f64> {
        let latent = if indices.is_empty() {
            Array1::zeros(self.rank())
        } else {
            let mut weights: Array1<f64> = indices.iter().map(|&i| self.idf[i]).collect();
            let norm = weights.dot(&weights).sqrt();
            if norm > 0.0 && norm.is_finite() {
                weights /= norm;
            } else {
                weights.fill(0.0);
            }
            let rows = self.u_rank.select(Axis(0), indices);
            weights.dot(&rows)
        };
        let scaled = latent * &self.s_rank;
        let dense = scaled.dot(&self.vh_rank) + &self.bias;
        dense.dot(&self.inverse)
    }
}
