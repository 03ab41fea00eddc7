//! Best-effort capture timestamps.
//!
//! Priority: embedded metadata, then a date in the filename, then the file's
//! modification time.

use std::{sync::LazyLock, time::SystemTime};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

/// Matches camera, phone and messenger naming schemes such as
/// `IMG_20230514_123456`, `PXL_20230514_123456789`,
/// `Screenshot_2023-05-14-12-34-56` and
/// `WhatsApp Image 2023-05-14 at 12.34.56`.
static FILENAME_DATE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?x)
    (?:^|[^0-9])
    (?P<y>(?:19|20)\d{2}) [-_.]? (?P<m>\d{2}) [-_.]? (?P<d>\d{2})
    (?:
      (?:[-_T\ .]|\ at\ )
      (?P<h>\d{2}) [-_.:]? (?P<min>\d{2}) [-_.:]? (?P<s>\d{2})
    )?
    ",
  )
  .expect("static regex")
});

/// Extract a timestamp embedded in a filename. A date without a time maps to
/// midnight.
pub fn from_filename(filename: &str) -> Option<NaiveDateTime> {
  FILENAME_DATE.captures_iter(filename).find_map(|caps| {
    let num = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());

    let date = NaiveDate::from_ymd_opt(num("y")? as i32, num("m")?, num("d")?)?;
    let time = match (num("h"), num("min"), num("s")) {
      (Some(h), Some(m), Some(s)) => NaiveTime::from_hms_opt(h, m, s)?,
      _ => NaiveTime::from_hms_opt(0, 0, 0)?,
    };
    Some(date.and_time(time))
  })
}

/// Convert a filesystem timestamp to local wall-clock time.
pub fn from_system_time(t: SystemTime) -> NaiveDateTime {
  DateTime::<Local>::from(t).naive_local()
}

/// Combine the three sources in priority order.
pub fn resolve(
  metadata: Option<NaiveDateTime>,
  filename: &str,
  modified: Option<SystemTime>,
) -> Option<NaiveDateTime> {
  metadata
    .or_else(|| from_filename(filename))
    .or_else(|| modified.map(from_system_time))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
      .unwrap()
      .and_hms_opt(h, mi, s)
      .unwrap()
  }

  #[test]
  fn camera_and_phone_names() {
    assert_eq!(from_filename("IMG_20230514_123456.jpg"), Some(dt(2023, 5, 14, 12, 34, 56)));
    assert_eq!(from_filename("PXL_20230514_123456789.jpg"), Some(dt(2023, 5, 14, 12, 34, 56)));
    assert_eq!(
      from_filename("Screenshot_2023-05-14-12-34-56.png"),
      Some(dt(2023, 5, 14, 12, 34, 56))
    );
    assert_eq!(
      from_filename("WhatsApp Image 2023-05-14 at 12.34.56.jpeg"),
      Some(dt(2023, 5, 14, 12, 34, 56))
    );
  }

  #[test]
  fn date_only_is_midnight() {
    assert_eq!(from_filename("holiday 2019-08-02.png"), Some(dt(2019, 8, 2, 0, 0, 0)));
  }

  #[test]
  fn rejects_impossible_dates_and_plain_names() {
    assert_eq!(from_filename("IMG_20231345_000000.jpg"), None);
    assert_eq!(from_filename("DSC01234.JPG"), None);
    assert_eq!(from_filename("beach.jpg"), None);
  }

  #[test]
  fn metadata_beats_filename_beats_mtime() {
    let exif = dt(2001, 1, 1, 1, 1, 1);
    let mtime = SystemTime::UNIX_EPOCH;

    assert_eq!(resolve(Some(exif), "IMG_20230514_123456.jpg", Some(mtime)), Some(exif));
    assert_eq!(
      resolve(None, "IMG_20230514_123456.jpg", Some(mtime)),
      Some(dt(2023, 5, 14, 12, 34, 56))
    );
    assert_eq!(resolve(None, "beach.jpg", Some(mtime)), Some(from_system_time(mtime)));
    assert_eq!(resolve(None, "beach.jpg", None), None);
  }
}
