use crate::data::{ChoiceData, ChoiceSet, DataError};
use crate::util::create_parent;
use csv::WriterBuilder;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

/// Read a choice-set CSV file and convert it to a [ChoiceData] object
///
/// # Arguments
///
/// * `path` - The path to the CSV file
///
/// # Format details
///
/// The file must have a header row with the columns `choice_id`, `y` and `deg`; an
/// optional `fof` column carries the friend-of-friend flag (missing means `0`). Headers are
/// case-insensitive, lines starting with `#` are skipped and unknown columns are ignored.
///
/// Rows sharing a `choice_id` form one [ChoiceSet]; sets are ordered by the first row in
/// which their id appears. Flags accept `0`/`1`, `0.0`/`1.0` and `true`/`false`.
///
/// # Example
///
/// ```rust,no_run
/// use netgrowth::read_choices;
///
/// let data = read_choices("data/choices/test_pa.csv").unwrap();
/// println!("Number of choice sets: {}", data.len());
/// ```
pub fn read_choices(path: impl AsRef<Path>) -> Result<ChoiceData, DataError> {
    let file = std::fs::File::open(path.as_ref()).map_err(|e| {
        DataError::CSVError(format!("{}: {}", path.as_ref().display(), e))
    })?;
    read_choices_from_reader(file)
}

/// Same as [read_choices], from any reader
pub fn read_choices_from_reader<R: Read>(reader: R) -> Result<ChoiceData, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| DataError::CSVError(e.to_string()))?
        .iter()
        .map(|h| h.to_lowercase())
        .collect::<Vec<_>>();
    reader.set_headers(csv::StringRecord::from(headers));

    // Rows grouped by choice id, in order of first appearance
    let mut index: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<(usize, Vec<Row>)> = Vec::new();
    for row_result in reader.deserialize() {
        let row: Row = row_result.map_err(|e| DataError::CSVError(e.to_string()))?;
        let slot = *index.entry(row.choice_id).or_insert_with(|| {
            groups.push((row.choice_id, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }

    let mut data = ChoiceData::default();
    for (id, rows) in groups {
        let chosen: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.y.then_some(i))
            .collect();
        let chosen = match chosen.as_slice() {
            [] => return Err(DataError::NoChoice { id }),
            [single] => *single,
            many => {
                return Err(DataError::MultipleChoices {
                    id,
                    count: many.len(),
                })
            }
        };
        let degrees = rows.iter().map(|r| r.deg).collect();
        let fof = rows.iter().map(|r| r.fof).collect();
        data.push(ChoiceSet::new(id, degrees, fof, chosen)?);
    }

    tracing::debug!("Read {}", data);
    Ok(data)
}

/// A [Row] is one candidate of one choice set
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "lowercase")]
struct Row {
    choice_id: usize,
    #[serde(deserialize_with = "deserialize_flag")]
    y: bool,
    deg: f64,
    #[serde(default, deserialize_with = "deserialize_flag")]
    fof: bool,
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    match s.to_lowercase().as_str() {
        "" | "0" | "0.0" | "false" => Ok(false),
        "1" | "1.0" | "true" => Ok(true),
        other => Err(serde::de::Error::custom(format!(
            "Expected one of 0/1 or true/false, got {}",
            other
        ))),
    }
}

impl ChoiceData {
    /// Write the dataset to a CSV file readable by [read_choices]
    ///
    /// Missing parent directories are created.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), DataError> {
        let path = path.as_ref();
        create_parent(path).map_err(|e| DataError::CSVError(e.to_string()))?;
        let file =
            std::fs::File::create(path).map_err(|e| DataError::CSVError(e.to_string()))?;
        self.write_to(file)
    }

    /// Write the dataset as CSV to any writer
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), DataError> {
        let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);

        writer
            .write_record(["choice_id", "y", "deg", "fof"])
            .map_err(|e| DataError::CSVError(e.to_string()))?;

        for set in self.iter() {
            for (i, (deg, fof)) in set.degrees().iter().zip(set.fof()).enumerate() {
                writer
                    .write_record([
                        set.id().to_string(),
                        u8::from(i == set.chosen()).to_string(),
                        deg.to_string(),
                        u8::from(*fof).to_string(),
                    ])
                    .map_err(|e| DataError::CSVError(e.to_string()))?;
            }
        }
        writer
            .flush()
            .map_err(|e| DataError::CSVError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_rows_by_choice_id() {
        let csv = "choice_id,y,deg,fof\n\
                   7,0,1,0\n\
                   7,1,4,1\n\
                   3,1,2,0\n\
                   7,0,9,0\n\
                   3,0,5,1\n";
        let data = read_choices_from_reader(csv.as_bytes()).unwrap();

        assert_eq!(data.len(), 2);
        let first = &data.sets()[0];
        assert_eq!(first.id(), 7);
        assert_eq!(first.degrees(), &[1.0, 4.0, 9.0]);
        assert_eq!(first.chosen(), 1);
        assert!(first.chosen_is_fof());

        let second = &data.sets()[1];
        assert_eq!(second.id(), 3);
        assert_eq!(second.chosen_degree(), 2.0);
    }

    #[test]
    fn headers_are_case_insensitive_and_fof_optional() {
        let csv = "# generated\nCHOICE_ID,Y,Deg,extra\n0,True,2,x\n0,False,3.0,y\n";
        let data = read_choices_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.sets()[0].n_fof(), 0);
        assert_eq!(data.sets()[0].chosen(), 0);
    }

    #[test]
    fn rejects_sets_without_exactly_one_choice() {
        let none = "choice_id,y,deg\n0,0,1\n0,0,2\n";
        assert_eq!(
            read_choices_from_reader(none.as_bytes()).unwrap_err(),
            DataError::NoChoice { id: 0 }
        );

        let many = "choice_id,y,deg\n5,1,1\n5,1,2\n5,0,2\n";
        assert_eq!(
            read_choices_from_reader(many.as_bytes()).unwrap_err(),
            DataError::MultipleChoices { id: 5, count: 2 }
        );
    }

    #[test]
    fn rejects_bad_flags() {
        let csv = "choice_id,y,deg\n0,yes,1\n";
        assert!(matches!(
            read_choices_from_reader(csv.as_bytes()),
            Err(DataError::CSVError(_))
        ));
    }

    #[test]
    fn empty_file_gives_empty_data() {
        let data = read_choices_from_reader("choice_id,y,deg,fof\n".as_bytes()).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn written_data_reads_back() {
        let data = ChoiceData::new(vec![
            ChoiceSet::new(0, vec![1.0, 4.0], vec![false, true], 1).unwrap(),
            ChoiceSet::new(1, vec![2.0, 9.0, 3.0], vec![true, false, false], 2).unwrap(),
        ]);
        let mut buffer = Vec::new();
        data.write_to(&mut buffer).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("choice_id,y,deg,fof\n0,0,1,0\n0,1,4,1\n"));

        let back = read_choices_from_reader(buffer.as_slice()).unwrap();
        assert_eq!(back, data);
    }
}
