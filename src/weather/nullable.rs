//! Serde helpers for hourly values that may be undefined.
//!
//! `serde_json` writes a NaN `f64` as `null` but refuses `null` when reading
//! an `f64`. These functions are used from `deserialize_with` attributes so
//! that a `null` hour reads back as NaN, which is how the pipeline marks an
//! undefined value.

use serde::{Deserialize, Deserializer};

/// Deserializes one value, mapping `null` to NaN.
pub fn value<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
}

/// Deserializes an hourly sequence, mapping each `null` to NaN.
pub fn vec<'de, D>(d: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Option<f64>>::deserialize(d)?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Like [`vec`] for a sequence that may be absent as a whole.
///
/// A `null` in place of the whole sequence means the field is absent.
pub fn option_vec<'de, D>(d: D) -> Result<Option<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Option<f64>>>::deserialize(d)?;
    Ok(values.map(|v| v.into_iter().map(|x| x.unwrap_or(f64::NAN)).collect()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Hours {
        #[serde(deserialize_with = "super::vec")]
        values: Vec<f64>,
        #[serde(default, deserialize_with = "super::option_vec")]
        optional: Option<Vec<f64>>,
        #[serde(deserialize_with = "super::value")]
        single: f64,
    }

    #[test]
    fn test_null_reads_as_nan() {
        let hours: Hours =
            serde_json::from_str(r#"{"values": [1.5, null, 2.0], "optional": [null, 0.5], "single": null}"#)
                .unwrap();
        assert_eq!(hours.values[0], 1.5);
        assert!(hours.values[1].is_nan());
        assert_eq!(hours.values[2], 2.0);

        let optional = hours.optional.unwrap();
        assert!(optional[0].is_nan());
        assert_eq!(optional[1], 0.5);
        assert!(hours.single.is_nan());
    }

    #[test]
    fn test_absent_optional_sequence() {
        let hours: Hours = serde_json::from_str(r#"{"values": [], "single": 1.0}"#).unwrap();
        assert!(hours.optional.is_none());

        let hours: Hours = serde_json::from_str(r#"{"values": [], "optional": null, "single": 1.0}"#).unwrap();
        assert!(hours.optional.is_none());
        assert_eq!(hours.single, 1.0);
    }

    #[test]
    fn test_other_types_still_rejected() {
        assert!(serde_json::from_str::<Hours>(r#"{"values": ["x"], "single": 1.0}"#).is_err());
    }
}
