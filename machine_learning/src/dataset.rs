mod iris;

use ndarray::{ArrayView1, ArrayView2};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

pub use iris::load_iris;

use crate::{MlErr, Result};

/// A labeled tabular dataset.
///
/// Features are stored row-major, one row per sample and one named column per feature. Labels
/// are class ids aligned by row index with the feature table.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    feature_names: Vec<String>,
    class_names: Vec<String>,
    data: Vec<f32>,
    labels: Vec<u32>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `feature_names` - The name of each feature column, in order.
    /// * `class_names` - The name of each class, indexed by class id.
    /// * `data` - The row-major feature values.
    /// * `labels` - The class id of each row.
    ///
    /// # Returns
    /// A new `Dataset` or an error if the buffers are not aligned.
    pub fn new(
        feature_names: Vec<String>,
        class_names: Vec<String>,
        data: Vec<f32>,
        labels: Vec<u32>,
    ) -> Result<Self> {
        if feature_names.is_empty() {
            return Err(MlErr::EmptyInput { what: "feature set" });
        }

        let x_size = feature_names.len();
        if data.len() != labels.len() * x_size {
            return Err(MlErr::SizeMismatch {
                what: "feature table",
                got: data.len(),
                expected: labels.len() * x_size,
            });
        }

        if let Some(&max) = labels.iter().max() {
            if max as usize >= class_names.len() {
                return Err(MlErr::SizeMismatch {
                    what: "class ids",
                    got: max as usize + 1,
                    expected: class_names.len(),
                });
            }
        }

        Ok(Self {
            feature_names,
            class_names,
            data,
            labels,
        })
    }

    /// Returns the amount of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the amount of features per sample.
    #[inline]
    pub fn x_size(&self) -> usize {
        self.feature_names.len()
    }

    /// Returns the amount of classes the labels may take.
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.class_names.len()
    }

    #[inline]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    #[inline]
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Gives a `(samples, features)` view of the feature table.
    pub fn features(&self) -> ArrayView2<'_, f32> {
        // SAFETY: `new` checks that `data` holds exactly `len * x_size` values.
        ArrayView2::from_shape((self.len(), self.x_size()), &self.data).unwrap()
    }

    /// Returns the features of the sample at `idx` (panics if out of bounds).
    pub fn row(&self, idx: usize) -> ArrayView1<'_, f32> {
        let x_size = self.x_size();
        ArrayView1::from(&self.data[idx * x_size..(idx + 1) * x_size])
    }

    #[inline]
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Builds a new dataset with the rows at `indices`, in that order.
    ///
    /// # Arguments
    /// * `indices` - The row indices to take (panics if any is out of bounds).
    pub fn select(&self, indices: &[usize]) -> Self {
        let x_size = self.x_size();
        let mut data = Vec::with_capacity(indices.len() * x_size);
        let mut labels = Vec::with_capacity(indices.len());

        for &i in indices {
            data.extend_from_slice(&self.data[i * x_size..(i + 1) * x_size]);
            labels.push(self.labels[i]);
        }

        Self {
            feature_names: self.feature_names.clone(),
            class_names: self.class_names.clone(),
            data,
            labels,
        }
    }

    /// Splits the dataset into a train and a test partition.
    ///
    /// The row indices are shuffled with a generator seeded from `seed`, the first
    /// `ceil(len * test_size)` of them form the test partition and the rest form the train
    /// partition. The same seed always yields the same partitions.
    ///
    /// # Arguments
    /// * `test_size` - The fraction of samples held out for testing, in `(0, 1)`.
    /// * `seed` - The seed for the shuffling.
    ///
    /// # Returns
    /// A `(train, test)` tuple or an error if any partition would be empty.
    pub fn train_test_split(&self, test_size: f64, seed: u64) -> Result<(Self, Self)> {
        let (train, test) = split_indices(self.len(), test_size, seed)?;
        Ok((self.select(&train), self.select(&test)))
    }
}

/// Computes the shuffled `(train, test)` row indices of a seeded split.
///
/// # Arguments
/// * `len` - The amount of samples.
/// * `test_size` - The fraction of samples held out for testing, in `(0, 1)`.
/// * `seed` - The seed for the shuffling.
pub fn split_indices(len: usize, test_size: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    let invalid = || MlErr::InvalidTestSize {
        test_size,
        samples: len,
    };

    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(invalid());
    }

    let n_test = (len as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= len {
        return Err(invalid());
    }

    let mut indices: Vec<usize> = (0..len).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}
