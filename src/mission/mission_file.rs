use super::{Waypoint, waypoint::round_8};
use rand::{Rng, distr::Alphanumeric};
use std::{
    fmt::Write,
    path::{Path, PathBuf},
};

/// First line of every mission file.
pub const HEADER: &str = "QGC WPL 110";

/// Renders `points` as a waypoint file the autopilot's mission loader accepts.
///
/// Each entry becomes
/// `index 0 3 16 0 0 0 0 lat lng 100.000000 1` (tab separated), with `index`
/// counting from zero. The output must stay byte-exact.
pub fn render(points: &[Waypoint]) -> String {
    let mut out = String::with_capacity(64 * (points.len() + 1));
    out.push_str(HEADER);
    out.push('\n');
    for (i, wp) in points.iter().enumerate() {
        // writing into a String cannot fail
        let _ = writeln!(
            out,
            "{i}\t0\t3\t16\t0\t0\t0\t0\t{}\t{}\t100.000000\t1",
            coord_repr(wp.lat),
            coord_repr(wp.lng)
        );
    }
    out
}

/// Writes `contents` into a freshly named file in `dir` and returns its path.
pub async fn write_to_dir(dir: &Path, contents: &str) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let name: String = rand::rng().sample_iter(&Alphanumeric).take(12).map(char::from).collect();
    let path = dir.join(format!("{name}.waypoints"));
    tokio::fs::write(&path, contents).await?;
    Ok(path)
}

/// Shortest round-trip representation of a coordinate rounded to 8 places.
///
/// Integral values keep a trailing `.0` and magnitudes below `1e-4` switch to
/// exponent notation with a two-digit exponent (`1e-05`).
fn coord_repr(value: f64) -> String {
    let v = round_8(value);
    if v != 0.0 && v.abs() < 1e-4 {
        let sci = format!("{v:e}");
        let Some((mantissa, exp)) = sci.split_once('e') else { return sci };
        let exp: i32 = exp.parse().unwrap_or_default();
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exp.abs());
    }
    let plain = format!("{v}");
    if plain.contains('.') || plain.contains("inf") || plain.contains("NaN") {
        plain
    } else {
        format!("{plain}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_repr() {
        assert_eq!(coord_repr(30.0), "30.0");
        assert_eq!(coord_repr(-87.678_280_414), "-87.67828041");
        assert_eq!(coord_repr(0.000_01), "1e-05");
        assert_eq!(coord_repr(-0.000_015), "-1.5e-05");
        assert_eq!(coord_repr(0.0001), "0.0001");
        assert_eq!(coord_repr(0.0), "0.0");
    }

    #[test]
    fn test_render_lines() {
        let text = render(&[Waypoint::new(30.0, -87.0), Waypoint::new(30.123_456_789, -87.5)]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "QGC WPL 110");
        assert_eq!(lines[1], "0\t0\t3\t16\t0\t0\t0\t0\t30.0\t-87.0\t100.000000\t1");
        assert_eq!(lines[2], "1\t0\t3\t16\t0\t0\t0\t0\t30.12345679\t-87.5\t100.000000\t1");
        assert!(text.ends_with('\n'));
    }
}
