use serde::{Deserialize, Serialize};
use std::fmt;

use super::DataError;

/// The candidates of a single growth event
///
/// A [ChoiceSet] holds, for every candidate node a new edge could attach to, the features
/// the models condition on: the degree of the candidate and whether it was a
/// friend-of-friend of the node making the choice. Exactly one candidate is the chosen one.
///
/// # Examples
///
/// ```
/// use netgrowth::ChoiceSet;
///
/// let set = ChoiceSet::new(0, vec![3.0, 1.0, 7.0], vec![false, true, false], 0).unwrap();
/// assert_eq!(set.len(), 3);
/// assert_eq!(set.chosen_degree(), 3.0);
/// assert_eq!(set.n_fof(), 1);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChoiceSet {
    id: usize,
    chosen: usize,
    degrees: Vec<f64>,
    fof: Vec<bool>,
}

impl ChoiceSet {
    /// Constructs a new [ChoiceSet]
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier of the growth event (`choice_id`)
    /// * `degrees` - Degree of every candidate at the time of the choice
    /// * `fof` - Friend-of-friend flag of every candidate
    /// * `chosen` - Index of the chosen candidate in `degrees`
    ///
    /// # Errors
    ///
    /// Fails when the columns differ in length, when `chosen` is out of range, or when a
    /// degree is negative or not finite.
    pub fn new(
        id: usize,
        degrees: Vec<f64>,
        fof: Vec<bool>,
        chosen: usize,
    ) -> Result<Self, DataError> {
        if degrees.len() != fof.len() {
            return Err(DataError::LengthMismatch {
                id,
                degrees: degrees.len(),
                flags: fof.len(),
            });
        }
        if chosen >= degrees.len() {
            return Err(DataError::ChosenOutOfRange {
                id,
                chosen,
                len: degrees.len(),
            });
        }
        if let Some(&value) = degrees.iter().find(|d| !d.is_finite() || **d < 0.0) {
            return Err(DataError::InvalidDegree { id, value });
        }
        Ok(Self {
            id,
            chosen,
            degrees,
            fof,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Number of candidates, including the chosen one
    pub fn len(&self) -> usize {
        self.degrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degrees.is_empty()
    }

    /// Index of the chosen candidate
    pub fn chosen(&self) -> usize {
        self.chosen
    }

    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    pub fn fof(&self) -> &[bool] {
        &self.fof
    }

    pub fn chosen_degree(&self) -> f64 {
        self.degrees[self.chosen]
    }

    pub fn chosen_is_fof(&self) -> bool {
        self.fof[self.chosen]
    }

    /// Number of friend-of-friend candidates
    pub fn n_fof(&self) -> usize {
        self.fof.iter().filter(|f| **f).count()
    }
}

/// A collection of [ChoiceSet]s, in the order the growth events happened
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChoiceData {
    sets: Vec<ChoiceSet>,
}

impl ChoiceData {
    pub fn new(sets: Vec<ChoiceSet>) -> Self {
        ChoiceData { sets }
    }

    pub fn sets(&self) -> &[ChoiceSet] {
        &self.sets
    }

    pub fn push(&mut self, set: ChoiceSet) {
        self.sets.push(set);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChoiceSet> {
        self.sets.iter()
    }

    /// Number of choice sets
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Total number of candidate rows over all sets
    pub fn n_rows(&self) -> usize {
        self.sets.iter().map(|s| s.len()).sum()
    }

    /// Largest degree seen among all candidates
    pub fn max_degree(&self) -> f64 {
        self.sets
            .iter()
            .flat_map(|s| s.degrees().iter().copied())
            .fold(0.0, f64::max)
    }
}

impl<'a> IntoIterator for &'a ChoiceData {
    type Item = &'a ChoiceSet;
    type IntoIter = std::slice::Iter<'a, ChoiceSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

impl fmt::Display for ChoiceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChoiceData: {} choice sets, {} candidate rows",
            self.len(),
            self.n_rows()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_columns() {
        let err = ChoiceSet::new(4, vec![1.0, 2.0], vec![false], 0).unwrap_err();
        assert_eq!(
            err,
            DataError::LengthMismatch {
                id: 4,
                degrees: 2,
                flags: 1
            }
        );
    }

    #[test]
    fn rejects_chosen_out_of_range() {
        let err = ChoiceSet::new(1, vec![1.0, 2.0], vec![false, false], 2).unwrap_err();
        assert!(matches!(err, DataError::ChosenOutOfRange { chosen: 2, .. }));
    }

    #[test]
    fn rejects_negative_degree() {
        let err = ChoiceSet::new(1, vec![1.0, -2.0], vec![false, false], 0).unwrap_err();
        assert!(matches!(err, DataError::InvalidDegree { value, .. } if value == -2.0));
    }

    #[test]
    fn counts_rows_and_degrees() {
        let data = ChoiceData::new(vec![
            ChoiceSet::new(0, vec![1.0, 4.0], vec![false, true], 1).unwrap(),
            ChoiceSet::new(1, vec![2.0, 9.0, 3.0], vec![false, false, false], 0).unwrap(),
        ]);
        assert_eq!(data.len(), 2);
        assert_eq!(data.n_rows(), 5);
        assert_eq!(data.max_degree(), 9.0);
        assert!(data.sets()[0].chosen_is_fof());
        assert_eq!(
            data.to_string(),
            "ChoiceData: 2 choice sets, 5 candidate rows"
        );
    }
}
