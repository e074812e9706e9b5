use crate::dlog;
use crate::error::{Error, Result};
use crate::types::Coords;
use chrono::{DateTime, Utc};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesDecl, BytesEnd, BytesRef, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Where a recorded track or route starts; used in place of a map click.
///
/// # Errors
///
/// Returns [`Error::Gpx`] when the file has no `<trkpt>` or `<rtept>` with a valid position.
pub fn track_start(path: &Path) -> Result<Coords> {
    let bytes = fs::read(path)?;
    first_point(&bytes)?
        .ok_or_else(|| Error::gpx(format!("no track or route points in {}", path.display())))
}

/// First `<trkpt>` or `<rtept>` carrying both `lat` and `lon`. Timestamps are not required.
pub fn first_point(bytes: &[u8]) -> Result<Option<Coords>> {
    let mut xml = Reader::from_reader(bytes);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Eof) => return Ok(None),
            Ok(Event::Start(e) | Event::Empty(e))
                if matches!(e.name().as_ref(), b"trkpt" | b"rtept") =>
            {
                if let (Some(lat), Some(lon)) = parse_lat_lon(&e) {
                    return Ok(Some(Coords::new(lat, lon)));
                }
                dlog!("skipping point without lat/lon");
            }
            Err(e) => return Err(Error::gpx(format!("XML parse error: {e}"))),
            _ => {}
        }
        buf.clear();
    }
}

fn parse_lat_lon(e: &BytesStart<'_>) -> (Option<f64>, Option<f64>) {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for a in e.attributes().with_checks(false).flatten() {
        let key = a.key.as_ref();
        if key == b"lat"
            && let Ok(v) = a.unescape_value()
        {
            lat = v.parse::<f64>().ok();
        } else if key == b"lon"
            && let Ok(v) = a.unescape_value()
        {
            lon = v.parse::<f64>().ok();
        }
    }

    (lat, lon)
}

/// One `<wpt>` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub coords: Coords,
    pub time: Option<DateTime<Utc>>,
    pub name: String,
    pub desc: String,
    pub kind: String,
}

/// Write a GPX 1.1 document holding `waypoints`.
///
/// `center` (the current map view) is stored as the metadata bounds of a zero-size box.
pub fn write_waypoints<W: Write>(
    out: W,
    waypoints: &[Waypoint],
    center: Option<Coords>,
) -> Result<()> {
    let mut xml = Writer::new_with_indent(out, b' ', 2);

    emit(
        &mut xml,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut gpx = BytesStart::new("gpx");
    gpx.push_attribute(("version", "1.1"));
    gpx.push_attribute(("creator", "waymark"));
    gpx.push_attribute(("xmlns", "http://www.topografix.com/GPX/1/1"));
    emit(&mut xml, Event::Start(gpx))?;

    if let Some(c) = center {
        let lat = c.lat.to_string();
        let lon = c.lng.to_string();
        emit(&mut xml, Event::Start(BytesStart::new("metadata")))?;
        let mut bounds = BytesStart::new("bounds");
        bounds.push_attribute(("minlat", lat.as_str()));
        bounds.push_attribute(("minlon", lon.as_str()));
        bounds.push_attribute(("maxlat", lat.as_str()));
        bounds.push_attribute(("maxlon", lon.as_str()));
        emit(&mut xml, Event::Empty(bounds))?;
        emit(&mut xml, Event::End(BytesEnd::new("metadata")))?;
    }

    for wp in waypoints {
        let lat = wp.coords.lat.to_string();
        let lon = wp.coords.lng.to_string();
        let mut wpt = BytesStart::new("wpt");
        wpt.push_attribute(("lat", lat.as_str()));
        wpt.push_attribute(("lon", lon.as_str()));
        emit(&mut xml, Event::Start(wpt))?;

        if let Some(t) = wp.time {
            text_element(&mut xml, "time", &t.to_rfc3339())?;
        }
        text_element(&mut xml, "name", &wp.name)?;
        text_element(&mut xml, "desc", &wp.desc)?;
        text_element(&mut xml, "type", &wp.kind)?;

        emit(&mut xml, Event::End(BytesEnd::new("wpt")))?;
    }

    emit(&mut xml, Event::End(BytesEnd::new("gpx")))?;
    xml.into_inner().flush()?;
    Ok(())
}

/// Read back `<wpt>` entries (lat/lon plus name/desc/type/time).
///
/// Element text is taken verbatim, entity and character references included.
pub fn parse_waypoints(bytes: &[u8]) -> Result<Vec<Waypoint>> {
    let mut xml = Reader::from_reader(bytes);

    let mut buf = Vec::new();
    let mut out = Vec::new();
    let mut current: Option<Waypoint> = None;
    let mut field: Option<&'static str> = None;
    let mut text = String::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"wpt" => {
                    let (lat, lon) = parse_lat_lon(&e);
                    current = match (lat, lon) {
                        (Some(lat), Some(lon)) => Some(Waypoint {
                            coords: Coords::new(lat, lon),
                            time: None,
                            name: String::new(),
                            desc: String::new(),
                            kind: String::new(),
                        }),
                        _ => None,
                    };
                }
                b"name" => field = Some("name"),
                b"desc" => field = Some("desc"),
                b"type" => field = Some("type"),
                b"time" => field = Some("time"),
                _ => {}
            },
            Ok(Event::Text(e)) if field.is_some() => {
                let s = e
                    .decode()
                    .map_err(|e| Error::gpx(format!("XML decode error: {e}")))?;
                text.push_str(&s);
            }
            Ok(Event::GeneralRef(r)) if field.is_some() => push_ref(&mut text, &r)?,
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"wpt" {
                    out.extend(current.take());
                } else if let (Some(wp), Some(f)) = (current.as_mut(), field) {
                    let s = std::mem::take(&mut text);
                    match f {
                        "name" => wp.name = s,
                        "desc" => wp.desc = s,
                        "type" => wp.kind = s,
                        _ => {
                            wp.time = DateTime::parse_from_rfc3339(s.trim())
                                .ok()
                                .map(|t| t.with_timezone(&Utc));
                        }
                    }
                }
                field = None;
                text.clear();
            }
            Err(e) => return Err(Error::gpx(format!("XML parse error: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

/// Append the text an `&...;` reference stands for.
fn push_ref(text: &mut String, r: &BytesRef<'_>) -> Result<()> {
    if let Some(c) = r
        .resolve_char_ref()
        .map_err(|e| Error::gpx(format!("bad character reference: {e}")))?
    {
        text.push(c);
        return Ok(());
    }
    let name = r
        .decode()
        .map_err(|e| Error::gpx(format!("XML decode error: {e}")))?;
    let resolved = resolve_predefined_entity(&name)
        .ok_or_else(|| Error::gpx(format!("unknown entity &{name};")))?;
    text.push_str(resolved);
    Ok(())
}

fn text_element<W: Write>(xml: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    emit(xml, Event::Start(BytesStart::new(name)))?;
    emit(xml, Event::Text(BytesText::new(text)))?;
    emit(xml, Event::End(BytesEnd::new(name)))
}

fn emit<W: Write>(xml: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    xml.write_event(event)
        .map_err(|e| Error::gpx(format!("XML write error: {e}")))
}
