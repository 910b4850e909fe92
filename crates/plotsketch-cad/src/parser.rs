//! ASCII DXF group-code parser.
//!
//! A DXF file is a flat sequence of (group code, value) line pairs.
//! [`DxfParser::parse`] reads it strictly and reports any grammar
//! violation as a structural error. [`DxfParser::recover`] is the
//! best-effort second pass used for damaged files: it resynchronizes
//! on `0` group codes, drops whatever it cannot make sense of, and
//! counts every anomaly so the caller can report the degraded state
//! instead of hiding it.

use tracing::debug;

use crate::dxf_file::{
    DxfArc, DxfCircle, DxfEllipse, DxfEntity, DxfFile, DxfLayer, DxfLine, DxfPolyline, DxfSpline,
    DxfUnit,
};
use crate::error::{CadError, Result};

/// Entity type names the converter understands.
const KNOWN_ENTITIES: &[&str] = &[
    "LINE",
    "CIRCLE",
    "ARC",
    "ELLIPSE",
    "SPLINE",
    "LWPOLYLINE",
    "POLYLINE",
    "VERTEX",
    "SEQEND",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Header,
    Tables,
    Entities,
    Other,
}

/// Parser for the ASCII DXF format.
pub struct DxfParser;

impl DxfParser {
    /// Quick sanity check that the content looks like DXF at all.
    pub fn validate_header(content: &str) -> Result<()> {
        if content.contains("SECTION") {
            Ok(())
        } else {
            Err(CadError::structural("No SECTION marker found"))
        }
    }

    /// Strict parse. Any violation of the group-code grammar is a
    /// [`CadError::StructuralParse`].
    pub fn parse(content: &str) -> Result<DxfFile> {
        let (file, _residual) = Walker::new(true).run(content)?;
        Ok(file)
    }

    /// Best-effort recovery parse for structurally damaged files.
    ///
    /// Returns the salvaged drawing together with the number of
    /// anomalies encountered. Fails only when nothing salvageable
    /// remains.
    pub fn recover(content: &str) -> Result<(DxfFile, usize)> {
        let (file, residual) = Walker::new(false).run(content)?;
        if file.entities.is_empty() && file.layers.is_empty() && residual > 0 {
            return Err(CadError::structural(
                "Recovery found no salvageable DXF content",
            ));
        }
        debug!(
            entities = file.entities.len(),
            residual, "recovery parse finished"
        );
        Ok((file, residual))
    }
}

/// One pass over the pair stream. `strict` decides whether anomalies
/// abort the parse or are tallied and skipped.
struct Walker {
    strict: bool,
    residual: usize,
}

impl Walker {
    fn new(strict: bool) -> Self {
        Self {
            strict,
            residual: 0,
        }
    }

    /// Report an anomaly: error in strict mode, tally in recovery.
    fn anomaly(&mut self, reason: String) -> Result<()> {
        if self.strict {
            Err(CadError::structural(reason))
        } else {
            debug!(%reason, "skipping malformed DXF content");
            self.residual += 1;
            Ok(())
        }
    }

    fn run(mut self, content: &str) -> Result<(DxfFile, usize)> {
        let pairs = self.tokenize(content)?;

        let mut file = DxfFile::new();
        let mut section = Section::None;
        let mut saw_entities = false;
        let mut saw_eof = false;
        let mut pending_polyline: Option<DxfPolyline> = None;

        let mut idx = 0;
        while idx < pairs.len() {
            let (code, value) = pairs[idx];
            match (code, value) {
                (0, "SECTION") => {
                    if let Some(&(2, name)) = pairs.get(idx + 1) {
                        section = match name {
                            "HEADER" => Section::Header,
                            "TABLES" => Section::Tables,
                            "ENTITIES" => {
                                saw_entities = true;
                                Section::Entities
                            }
                            _ => Section::Other,
                        };
                        idx += 2;
                    } else {
                        self.anomaly("SECTION without a name".to_string())?;
                        section = Section::Other;
                        idx += 1;
                    }
                }
                (0, "ENDSEC") => {
                    if pending_polyline.is_some() {
                        self.anomaly("POLYLINE not terminated by SEQEND".to_string())?;
                        self.finalize_pending(&mut pending_polyline, &mut file);
                    }
                    section = Section::None;
                    idx += 1;
                }
                (0, "EOF") => {
                    saw_eof = true;
                    idx += 1;
                }
                (0, type_name) => {
                    let (record, next) = collect_record(&pairs, idx + 1);
                    self.handle_record(
                        type_name,
                        &record,
                        section,
                        &mut pending_polyline,
                        &mut file,
                    )?;
                    idx = next;
                }
                (9, var) if section == Section::Header => {
                    // Header variable followed by its value pair.
                    if let Some(&(value_code, value)) = pairs.get(idx + 1) {
                        if value_code != 0 && value_code != 9 {
                            match var {
                                "$ACADVER" => file.header.version = value.to_string(),
                                "$INSUNITS" => {
                                    let code = value.parse::<i32>().unwrap_or(4);
                                    file.header.unit = DxfUnit::from_insunits(code);
                                }
                                _ => {}
                            }
                            idx += 2;
                            continue;
                        }
                    }
                    idx += 1;
                }
                _ => idx += 1,
            }
        }

        if pending_polyline.is_some() {
            self.anomaly("POLYLINE not terminated by SEQEND".to_string())?;
            self.finalize_pending(&mut pending_polyline, &mut file);
        }
        if !saw_entities {
            self.anomaly("Missing ENTITIES section".to_string())?;
        }
        if !saw_eof {
            self.anomaly("Missing EOF marker".to_string())?;
        }

        Ok((file, self.residual))
    }

    /// Split the content into (code, value) pairs. In recovery mode a
    /// line that is not a valid group code resynchronizes instead of
    /// failing.
    fn tokenize<'a>(&mut self, content: &'a str) -> Result<Vec<(i32, &'a str)>> {
        let lines: Vec<&str> = content.lines().collect();
        let mut pairs = Vec::with_capacity(lines.len() / 2);
        let mut i = 0;
        while i < lines.len() {
            let code_line = lines[i].trim();
            match code_line.parse::<i32>() {
                Ok(code) => {
                    if let Some(value) = lines.get(i + 1) {
                        pairs.push((code, value.trim()));
                        i += 2;
                    } else {
                        self.anomaly("Truncated group code pair at end of file".to_string())?;
                        break;
                    }
                }
                Err(_) => {
                    self.anomaly(format!("Line {} is not a group code: {:?}", i + 1, code_line))?;
                    i += 1;
                }
            }
        }
        Ok(pairs)
    }

    /// Dispatch one `0`-code record according to the current section.
    fn handle_record(
        &mut self,
        type_name: &str,
        record: &[(i32, &str)],
        section: Section,
        pending_polyline: &mut Option<DxfPolyline>,
        file: &mut DxfFile,
    ) -> Result<()> {
        match section {
            Section::Tables => {
                if type_name == "LAYER" {
                    let name = str_group(record, 2).unwrap_or_default().to_string();
                    if !name.is_empty() {
                        let color = int_group(record, 62).unwrap_or(7) as i16;
                        file.add_layer(DxfLayer { name, color });
                    }
                }
                // TABLE/ENDTAB and other record kinds carry no geometry.
                Ok(())
            }
            Section::Entities => self.handle_entity(type_name, record, pending_polyline, file),
            Section::Header | Section::Other => Ok(()),
            Section::None => {
                // Recovery accepts entities stranded outside any
                // section; strict mode does not.
                if KNOWN_ENTITIES.contains(&type_name) {
                    if self.strict {
                        return Err(CadError::structural(format!(
                            "Entity {} outside any section",
                            type_name
                        )));
                    }
                    self.residual += 1;
                    self.handle_entity(type_name, record, pending_polyline, file)
                } else {
                    self.anomaly(format!("Stray record {} outside any section", type_name))
                }
            }
        }
    }

    fn handle_entity(
        &mut self,
        type_name: &str,
        record: &[(i32, &str)],
        pending_polyline: &mut Option<DxfPolyline>,
        file: &mut DxfFile,
    ) -> Result<()> {
        let built = match type_name {
            "POLYLINE" => {
                if pending_polyline.is_some() {
                    self.anomaly("Nested POLYLINE".to_string())?;
                    self.finalize_pending(pending_polyline, file);
                }
                *pending_polyline = Some(DxfPolyline {
                    vertices: Vec::new(),
                    closed: int_group(record, 70).unwrap_or(0) & 1 != 0,
                    lightweight: false,
                    layer: layer_group(record),
                    color: color_group(record),
                });
                return Ok(());
            }
            "VERTEX" => {
                match pending_polyline {
                    Some(poly) => match point_group(record, 10, 20) {
                        Ok(p) => poly.vertices.push(p),
                        Err(e) => self.entity_anomaly("VERTEX", e)?,
                    },
                    None => self.anomaly("VERTEX without enclosing POLYLINE".to_string())?,
                }
                return Ok(());
            }
            "SEQEND" => {
                if pending_polyline.is_none() {
                    self.anomaly("SEQEND without enclosing POLYLINE".to_string())?;
                }
                self.finalize_pending(pending_polyline, file);
                return Ok(());
            }
            "LINE" => build_line(record),
            "CIRCLE" => build_circle(record),
            "ARC" => build_arc(record),
            "ELLIPSE" => build_ellipse(record),
            "SPLINE" => build_spline(record),
            "LWPOLYLINE" => build_lwpolyline(record),
            other => Ok(DxfEntity::Unsupported {
                type_name: other.to_string(),
            }),
        };
        match built {
            Ok(entity) => file.add_entity(entity),
            Err(e) => self.entity_anomaly(type_name, e)?,
        }
        Ok(())
    }

    /// A malformed entity body: structural in strict mode, dropped and
    /// tallied in recovery.
    fn entity_anomaly(&mut self, type_name: &str, err: CadError) -> Result<()> {
        self.anomaly(format!("Malformed {} entity: {}", type_name, err))
    }

    fn finalize_pending(&mut self, pending: &mut Option<DxfPolyline>, file: &mut DxfFile) {
        if let Some(poly) = pending.take() {
            if poly.vertices.is_empty() {
                debug!("dropping POLYLINE with no vertices");
                if !self.strict {
                    self.residual += 1;
                }
            } else {
                file.add_entity(DxfEntity::Polyline(poly));
            }
        }
    }
}

/// Pairs of one record, i.e. everything up to the next `0` group code.
fn collect_record<'a>(
    pairs: &[(i32, &'a str)],
    start: usize,
) -> (Vec<(i32, &'a str)>, usize) {
    let mut idx = start;
    while idx < pairs.len() && pairs[idx].0 != 0 {
        idx += 1;
    }
    (pairs[start..idx].to_vec(), idx)
}

fn str_group<'a>(record: &[(i32, &'a str)], code: i32) -> Option<&'a str> {
    record.iter().find(|(c, _)| *c == code).map(|(_, v)| *v)
}

fn int_group(record: &[(i32, &str)], code: i32) -> Option<i32> {
    str_group(record, code).and_then(|v| v.parse().ok())
}

fn f64_group(record: &[(i32, &str)], code: i32) -> Result<Option<f64>> {
    match str_group(record, code) {
        None => Ok(None),
        Some(v) => v
            .parse::<f64>()
            .map(Some)
            .map_err(|_| CadError::structural(format!("Group {} is not a number: {:?}", code, v))),
    }
}

fn required_f64(record: &[(i32, &str)], code: i32, what: &str) -> Result<f64> {
    f64_group(record, code)?
        .ok_or_else(|| CadError::structural(format!("Missing group {} ({})", code, what)))
}

fn point_group(record: &[(i32, &str)], x_code: i32, y_code: i32) -> Result<plotsketch_core::Point> {
    Ok(plotsketch_core::Point::new(
        required_f64(record, x_code, "x")?,
        required_f64(record, y_code, "y")?,
    ))
}

fn layer_group(record: &[(i32, &str)]) -> String {
    str_group(record, 8).unwrap_or("0").to_string()
}

fn color_group(record: &[(i32, &str)]) -> i16 {
    // 256 is the ByLayer sentinel.
    int_group(record, 62).unwrap_or(256) as i16
}

fn build_line(record: &[(i32, &str)]) -> Result<DxfEntity> {
    Ok(DxfEntity::Line(DxfLine {
        start: point_group(record, 10, 20)?,
        end: point_group(record, 11, 21)?,
        layer: layer_group(record),
        color: color_group(record),
    }))
}

fn build_circle(record: &[(i32, &str)]) -> Result<DxfEntity> {
    Ok(DxfEntity::Circle(DxfCircle {
        center: point_group(record, 10, 20)?,
        radius: required_f64(record, 40, "radius")?,
        layer: layer_group(record),
        color: color_group(record),
    }))
}

fn build_arc(record: &[(i32, &str)]) -> Result<DxfEntity> {
    Ok(DxfEntity::Arc(DxfArc {
        center: point_group(record, 10, 20)?,
        radius: required_f64(record, 40, "radius")?,
        start_angle: required_f64(record, 50, "start angle")?,
        end_angle: required_f64(record, 51, "end angle")?,
        layer: layer_group(record),
        color: color_group(record),
    }))
}

fn build_ellipse(record: &[(i32, &str)]) -> Result<DxfEntity> {
    let major = point_group(record, 11, 21)?;
    Ok(DxfEntity::Ellipse(DxfEllipse {
        center: point_group(record, 10, 20)?,
        major_axis: (major.x, major.y),
        ratio: required_f64(record, 40, "axis ratio")?,
        start_param: f64_group(record, 41)?.unwrap_or(0.0),
        end_param: f64_group(record, 42)?.unwrap_or(std::f64::consts::TAU),
        layer: layer_group(record),
        color: color_group(record),
    }))
}

fn build_spline(record: &[(i32, &str)]) -> Result<DxfEntity> {
    Ok(DxfEntity::Spline(DxfSpline {
        control_points: vertex_list(record)?,
        degree: int_group(record, 71).unwrap_or(3).max(1) as usize,
        layer: layer_group(record),
        color: color_group(record),
    }))
}

fn build_lwpolyline(record: &[(i32, &str)]) -> Result<DxfEntity> {
    Ok(DxfEntity::Polyline(DxfPolyline {
        vertices: vertex_list(record)?,
        closed: int_group(record, 70).unwrap_or(0) & 1 != 0,
        lightweight: true,
        layer: layer_group(record),
        color: color_group(record),
    }))
}

/// Repeated 10/20 coordinate pairs, in order of appearance.
fn vertex_list(record: &[(i32, &str)]) -> Result<Vec<plotsketch_core::Point>> {
    let mut vertices: Vec<plotsketch_core::Point> = Vec::new();
    let mut pending_x: Option<f64> = None;
    for &(code, value) in record {
        let parse = |v: &str| {
            v.parse::<f64>()
                .map_err(|_| CadError::structural(format!("Vertex value is not a number: {:?}", v)))
        };
        match code {
            10 => {
                if pending_x.is_some() {
                    return Err(CadError::structural("Vertex x without matching y"));
                }
                pending_x = Some(parse(value)?);
            }
            20 => {
                let x = pending_x
                    .take()
                    .ok_or_else(|| CadError::structural("Vertex y without matching x"))?;
                vertices.push(plotsketch_core::Point::new(x, parse(value)?));
            }
            _ => {}
        }
    }
    if pending_x.is_some() {
        return Err(CadError::structural("Vertex x without matching y"));
    }
    Ok(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dxf_file::DxfEntityType;

    fn minimal_dxf(entities: &str) -> String {
        format!(
            "0\nSECTION\n2\nHEADER\n9\n$ACADVER\n1\nAC1024\n9\n$INSUNITS\n70\n4\n0\nENDSEC\n\
             0\nSECTION\n2\nENTITIES\n{}0\nENDSEC\n0\nEOF\n",
            entities
        )
    }

    #[test]
    fn test_validate_header() {
        assert!(DxfParser::validate_header("0\nSECTION\n0\nENDSEC\n").is_ok());
        assert!(DxfParser::validate_header("INVALID").is_err());
    }

    #[test]
    fn test_parse_line_entity() {
        let content = minimal_dxf("0\nLINE\n8\nSHAPES\n62\n1\n10\n0.0\n20\n0.0\n11\n10.0\n21\n5.0\n");
        let file = DxfParser::parse(&content).unwrap();
        assert_eq!(file.entity_count(), 1);
        match &file.entities[0] {
            DxfEntity::Line(line) => {
                assert_eq!(line.end.x, 10.0);
                assert_eq!(line.end.y, 5.0);
                assert_eq!(line.layer, "SHAPES");
                assert_eq!(line.color, 1);
            }
            other => panic!("expected line, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_lwpolyline_closed_flag() {
        let content = minimal_dxf(
            "0\nLWPOLYLINE\n8\nSHAPES\n90\n3\n70\n1\n10\n0.0\n20\n0.0\n10\n5.0\n20\n0.0\n10\n5.0\n20\n5.0\n",
        );
        let file = DxfParser::parse(&content).unwrap();
        match &file.entities[0] {
            DxfEntity::Polyline(poly) => {
                assert!(poly.closed);
                assert!(poly.lightweight);
                assert_eq!(poly.vertices.len(), 3);
            }
            other => panic!("expected polyline, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_legacy_polyline() {
        let content = minimal_dxf(
            "0\nPOLYLINE\n8\nSTROKES\n0\nVERTEX\n10\n1.0\n20\n2.0\n0\nVERTEX\n10\n3.0\n20\n4.0\n0\nSEQEND\n",
        );
        let file = DxfParser::parse(&content).unwrap();
        assert_eq!(file.entity_count(), 1);
        assert_eq!(file.entities[0].entity_type(), DxfEntityType::Polyline);
    }

    #[test]
    fn test_parse_header_units() {
        let content = minimal_dxf("");
        let file = DxfParser::parse(&content).unwrap();
        assert_eq!(file.header.version, "AC1024");
        assert_eq!(file.header.unit, DxfUnit::Millimeters);
    }

    #[test]
    fn test_unsupported_entity_is_tallied_not_fatal() {
        let content = minimal_dxf("0\nTEXT\n8\n0\n10\n0.0\n20\n0.0\n1\nhello\n");
        let file = DxfParser::parse(&content).unwrap();
        assert_eq!(file.entity_count(), 1);
        assert_eq!(file.entities[0].entity_type(), DxfEntityType::Unsupported);
    }

    #[test]
    fn test_strict_rejects_missing_eof() {
        let content = "0\nSECTION\n2\nENTITIES\n0\nENDSEC\n";
        let err = DxfParser::parse(content).unwrap_err();
        assert!(matches!(err, CadError::StructuralParse { .. }));
    }

    #[test]
    fn test_strict_rejects_garbage_line() {
        let content = minimal_dxf("0\nLINE\n10\n0.0\n20\n0.0\n11\n1.0\n21\n1.0\n")
            .replace("11\n1.0", "eleven\n1.0");
        assert!(DxfParser::parse(&content).is_err());
    }

    #[test]
    fn test_recover_salvages_entities_from_damaged_file() {
        // Garbage interleaved between two well-formed entities.
        let content = minimal_dxf(
            "0\nLINE\n10\n0.0\n20\n0.0\n11\n1.0\n21\n1.0\n\
             <<< corrupted block >>>\n\
             0\nCIRCLE\n10\n5.0\n20\n5.0\n40\n2.0\n",
        );
        assert!(DxfParser::parse(&content).is_err());
        let (file, residual) = DxfParser::recover(&content).unwrap();
        assert_eq!(file.entity_count(), 2);
        assert!(residual > 0);
    }

    #[test]
    fn test_recover_accepts_entities_outside_sections() {
        let content = "0\nLINE\n10\n0.0\n20\n0.0\n11\n2.0\n21\n2.0\n";
        let (file, residual) = DxfParser::recover(content).unwrap();
        assert_eq!(file.entity_count(), 1);
        // Stranded entity plus missing section and EOF markers.
        assert!(residual >= 3);
    }

    #[test]
    fn test_recover_rejects_pure_garbage() {
        let err = DxfParser::recover("this is not\na dxf file\nat all").unwrap_err();
        assert!(matches!(err, CadError::StructuralParse { .. }));
    }

    #[test]
    fn test_recover_drops_malformed_entity_keeps_rest() {
        let content = minimal_dxf(
            "0\nCIRCLE\n10\nnotanumber\n20\n0.0\n40\n1.0\n\
             0\nLINE\n10\n0.0\n20\n0.0\n11\n1.0\n21\n1.0\n",
        );
        let (file, residual) = DxfParser::recover(&content).unwrap();
        assert_eq!(file.entity_count(), 1);
        assert_eq!(file.entities[0].entity_type(), DxfEntityType::Line);
        assert_eq!(residual, 1);
    }
}
