//! Serialization of already-computed tables.
//!
//! Writers take any [`Write`] sink; creating directories and choosing file
//! names is the caller's business.
//!
//! - comparison table: `C,bits,H(M),H(M1|M0),S_info,R_info,L(M) proxy,F(C),distinct`
//! - phase grid: header row of flip values, one row per noise value
//! - redundancy curve: `fragments,R_info`

use std::io::{self, Write};

use crate::functional::EvaluationRecord;
use crate::sweep::{PhaseDiagram, RedundancyCurve};

pub const TABLE_HEADER: &str = "C,bits,H(M),H(M1|M0),S_info,R_info,L(M) proxy,F(C),distinct";
pub const REDUNDANCY_HEADER: &str = "fragments,R_info";

/// Quote a CSV field when it contains a separator, quote, or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn write_table_csv<W: Write>(mut w: W, records: &[EvaluationRecord]) -> io::Result<()> {
    writeln!(w, "{TABLE_HEADER}")?;
    for r in records {
        writeln!(
            w,
            "{},{},{},{},{},{},{},{},{}",
            csv_field(&r.coarse_graining),
            r.bits,
            r.entropy,
            r.conditional_entropy,
            r.s_info,
            r.r_info,
            r.description_length,
            r.score,
            r.distinct
        )?;
    }
    w.flush()
}

pub fn write_phase_csv<W: Write>(mut w: W, diagram: &PhaseDiagram) -> io::Result<()> {
    let header: Vec<String> = diagram.flip_values.iter().map(f64::to_string).collect();
    writeln!(w, ",{}", header.join(","))?;
    for (noise, row) in diagram.noise_values.iter().zip(&diagram.scores) {
        let cells: Vec<String> = row.iter().map(f64::to_string).collect();
        writeln!(w, "{noise},{}", cells.join(","))?;
    }
    w.flush()
}

pub fn write_redundancy_csv<W: Write>(mut w: W, curve: &RedundancyCurve) -> io::Result<()> {
    writeln!(w, "{REDUNDANCY_HEADER}")?;
    for p in &curve.points {
        writeln!(w, "{},{}", p.fragments, p.r_info)?;
    }
    w.flush()
}

/// Plain-text table, one line per record, in the given order.
pub fn format_table(records: &[EvaluationRecord]) -> String {
    let mut out = format!(
        "{:<24} {:>4} {:>8} {:>9} {:>8} {:>8} {:>8} {:>9} {:>8}\n",
        "C", "bits", "H(M)", "H(M1|M0)", "S_info", "R_info", "L(M)", "F(C)", "distinct"
    );
    for r in records {
        out.push_str(&format!(
            "{:<24} {:>4} {:>8.4} {:>9.4} {:>8.4} {:>8.4} {:>8.4} {:>9.4} {:>8}\n",
            r.coarse_graining,
            r.bits,
            r.entropy,
            r.conditional_entropy,
            r.s_info,
            r.r_info,
            r.description_length,
            r.score,
            r.distinct
        ));
    }
    out
}

const SHADES: &[u8] = b" .:-=+*#%@";

/// Character-shaded heatmap of a phase diagram. Highest noise on top, flip
/// probability increasing to the right; denser glyphs mean higher `F(C)`.
pub fn render_heatmap(diagram: &PhaseDiagram) -> String {
    let (lo, hi) = diagram.range();
    let span = hi - lo;
    let shade = |v: f64| -> char {
        let t = if span > 0.0 { (v - lo) / span } else { 0.5 };
        let idx = (t * (SHADES.len() - 1) as f64).round() as usize;
        SHADES[idx.min(SHADES.len() - 1)] as char
    };

    let mut out = format!("Phase diagram F(C) - {}\n", diagram.coarse_graining);
    for (noise, row) in diagram.noise_values.iter().zip(&diagram.scores).rev() {
        let cells: String = row.iter().flat_map(|&v| [shade(v), shade(v)]).collect();
        out.push_str(&format!("  q={noise:<6.3} |{cells}|\n"));
    }
    if let (Some(first), Some(last)) = (diagram.flip_values.first(), diagram.flip_values.last()) {
        out.push_str(&format!(
            "  flip probability {first:.3} .. {last:.3}; F(C) range [{lo:.3}, {hi:.3}]\n"
        ));
    }
    out
}
