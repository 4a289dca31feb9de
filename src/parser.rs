use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::TrackError;
use crate::gpx_types::*;

type Result<T> = std::result::Result<T, TrackError>;

/// Parse a GPX XML string into GpxData.
///
/// Only `<trk>` content is collected; waypoints, routes and metadata are
/// skipped. A document without a `<gpx>` element is rejected.
pub fn parse_gpx(xml: &str) -> Result<GpxData> {
    let mut reader = Reader::from_str(xml);
    let mut data = GpxData::default();
    let mut seen_root = false;
    let mut root_closed = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"gpx" => {
                    read_root_attributes(&e, &mut data)?;
                    seen_root = true;
                }
                b"trk" if seen_root => data.tracks.push(parse_track(&mut reader)?),
                b"wpt" | b"rte" | b"metadata" | b"extensions" => {
                    reader.read_to_end(e.name())?;
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"gpx" => {
                    read_root_attributes(&e, &mut data)?;
                    seen_root = true;
                    root_closed = true;
                }
                b"trk" if seen_root => data.tracks.push(GpxTrack::default()),
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"gpx" => root_closed = true,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TrackError::XmlParse(e)),
            _ => {}
        }
    }

    if !seen_root {
        return Err(TrackError::MissingRoot);
    }
    if !root_closed {
        return Err(truncated("gpx"));
    }
    Ok(data)
}

/// The track at `index`.
pub fn select_track(data: &GpxData, index: usize) -> Result<&GpxTrack> {
    if data.tracks.is_empty() {
        return Err(TrackError::NoTracks);
    }
    data.tracks
        .get(index)
        .ok_or(TrackError::TrackIndexOutOfRange {
            index,
            available: data.tracks.len(),
        })
}

/// Point sequence of the track at `index`, segments concatenated.
pub fn track_points(data: &GpxData, index: usize) -> Result<Vec<RawGeoPoint>> {
    Ok(select_track(data, index)?.points())
}

fn read_root_attributes(e: &BytesStart<'_>, data: &mut GpxData) -> Result<()> {
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| TrackError::XmlParse(e.into()))?;
        let val = std::str::from_utf8(&attr.value).unwrap_or_default();
        match attr.key.local_name().as_ref() {
            b"version" => data.version = Some(val.to_string()),
            b"creator" => data.creator = Some(val.to_string()),
            _ => {}
        }
    }
    Ok(())
}

/// Parse lat/lon attributes from a point element's start tag.
/// Returns `None` when either is missing or not a number.
fn parse_lat_lon(e: &BytesStart<'_>) -> Result<Option<(f64, f64)>> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| TrackError::XmlParse(e.into()))?;
        let val = std::str::from_utf8(&attr.value).unwrap_or_default();
        match attr.key.local_name().as_ref() {
            b"lat" => lat = val.trim().parse::<f64>().ok(),
            b"lon" => lon = val.trim().parse::<f64>().ok(),
            _ => {}
        }
    }

    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Some((lat, lon))),
        _ => {
            debug!("skipping <trkpt> with missing or invalid lat/lon");
            Ok(None)
        }
    }
}

/// Parse a <trkpt> element and its children.
/// Called after receiving Event::Start for the point element.
fn parse_point<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
) -> Result<Option<RawGeoPoint>> {
    let Some((lat, lon)) = parse_lat_lon(start)? else {
        reader.read_to_end(start.name())?;
        return Ok(None);
    };

    let mut point = RawGeoPoint::new(lon, lat, None);
    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ele" => {
                    let text = read_text_owned(reader, &e)?;
                    point.ele = text.trim().parse::<f64>().ok();
                }
                _ => {
                    // time, name, extensions, GPX 1.0 speed/course...
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => return Err(truncated("trkpt")),
            Err(e) => return Err(TrackError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(Some(point))
}

/// Parse a <trk> element.
fn parse_track<'a>(reader: &mut Reader<&'a [u8]>) -> Result<GpxTrack> {
    let mut track = GpxTrack::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => track.name = Some(read_text_owned(reader, &e)?),
                b"type" => track.track_type = Some(read_text_owned(reader, &e)?),
                b"trkseg" => {
                    let seg = parse_segment(reader)?;
                    if !seg.points.is_empty() {
                        track.segments.push(seg);
                    }
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trk" => break,
            Ok(Event::Eof) => return Err(truncated("trk")),
            Err(e) => return Err(TrackError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(track)
}

/// Parse a <trkseg> element.
fn parse_segment<'a>(reader: &mut Reader<&'a [u8]>) -> Result<GpxSegment> {
    let mut segment = GpxSegment::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => {
                    if let Some(pt) = parse_point(&e, reader)? {
                        segment.points.push(pt);
                    }
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    if let Some((lat, lon)) = parse_lat_lon(&e)? {
                        segment.points.push(RawGeoPoint::new(lon, lat, None));
                    }
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkseg" => break,
            Ok(Event::Eof) => return Err(truncated("trkseg")),
            Err(e) => return Err(TrackError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(segment)
}

/// Read text content of an element as an owned String.
/// Handles regular text, CDATA sections, and entity references (Event::GeneralRef).
fn read_text_owned<'a>(
    reader: &mut Reader<&'a [u8]>,
    start: &BytesStart<'_>,
) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Ok(Event::CData(e)) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Ok(Event::GeneralRef(e)) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    match std::str::from_utf8(e.as_ref()).unwrap_or_default() {
                        "amp" => text.push('&'),
                        "lt" => text.push('<'),
                        "gt" => text.push('>'),
                        "quot" => text.push('"'),
                        "apos" => text.push('\''),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => {
                return Err(TrackError::Truncated {
                    element: String::from_utf8_lossy(&end_name).into_owned(),
                });
            }
            Err(e) => return Err(TrackError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(text)
}

fn truncated(element: &str) -> TrackError {
    TrackError::Truncated {
        element: element.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_simple_track() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="unit">
  <trk>
    <name>Morning Run</name>
    <trkseg>
      <trkpt lat="35.0" lon="139.0"><ele>10.0</ele></trkpt>
      <trkpt lat="35.001" lon="139.001"><ele>11.0</ele></trkpt>
      <trkpt lat="35.002" lon="139.002"><ele>12.0</ele></trkpt>
    </trkseg>
  </trk>
</gpx>"#;
        let data = parse_gpx(xml).unwrap();
        assert_eq!(data.version.as_deref(), Some("1.1"));
        assert_eq!(data.creator.as_deref(), Some("unit"));
        assert_eq!(data.tracks.len(), 1);
        assert_eq!(data.tracks[0].name.as_deref(), Some("Morning Run"));
        let pts = data.tracks[0].points();
        assert_eq!(pts.len(), 3);
        assert!((pts[0].lon - 139.0).abs() < 1e-10);
        assert!((pts[0].lat - 35.0).abs() < 1e-10);
        assert_eq!(pts[2].ele, Some(12.0));
    }

    #[test]
    fn test_multi_segment_points_concatenated() {
        let xml = r#"<gpx version="1.1">
  <trk>
    <trkseg>
      <trkpt lat="1" lon="10"/>
      <trkpt lat="2" lon="20"/>
    </trkseg>
    <trkseg>
      <trkpt lat="3" lon="30"/>
    </trkseg>
  </trk>
</gpx>"#;
        let data = parse_gpx(xml).unwrap();
        assert_eq!(data.tracks[0].segments.len(), 2);
        let lons: Vec<f64> = data.tracks[0].points().iter().map(|p| p.lon).collect();
        assert_eq!(lons, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_empty_segment_skipped() {
        let xml = r#"<gpx version="1.1">
  <trk>
    <trkseg></trkseg>
    <trkseg><trkpt lat="35.0" lon="139.0"/></trkseg>
  </trk>
</gpx>"#;
        let data = parse_gpx(xml).unwrap();
        assert_eq!(data.tracks[0].segments.len(), 1);
        assert_eq!(data.tracks[0].point_count(), 1);
    }

    #[test]
    fn test_missing_elevation_is_none() {
        let xml = r#"<gpx version="1.1"><trk><trkseg>
  <trkpt lat="1" lon="2"><time>2025-01-01T00:00:00Z</time></trkpt>
  <trkpt lat="1" lon="2"><ele>  abc </ele></trkpt>
  <trkpt lat="1" lon="2"><ele> 12.5 </ele></trkpt>
</trkseg></trk></gpx>"#;
        let pts = parse_gpx(xml).unwrap().tracks[0].points();
        assert_eq!(pts[0].ele, None);
        assert_eq!(pts[1].ele, None);
        assert_eq!(pts[2].ele, Some(12.5));
    }

    #[test]
    fn test_invalid_lat_lon_skipped() {
        let xml = r#"<gpx version="1.1"><trk><trkseg>
  <trkpt lat="1" lon="2"><ele>1</ele></trkpt>
  <trkpt lon="2"><ele>2</ele></trkpt>
  <trkpt lat="north" lon="2"/>
  <trkpt lat="3" lon="4"><ele>3</ele></trkpt>
</trkseg></trk></gpx>"#;
        let pts = parse_gpx(xml).unwrap().tracks[0].points();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[1].ele, Some(3.0));
    }

    #[test]
    fn test_waypoints_and_routes_ignored() {
        let xml = r#"<gpx xmlns="http://www.topografix.com/GPX/1/1" version="1.1">
  <metadata><name>Meta</name></metadata>
  <wpt lat="35.0" lon="139.0"><name>Tokyo</name></wpt>
  <rte><rtept lat="35.0" lon="139.0"/></rte>
</gpx>"#;
        let data = parse_gpx(xml).unwrap();
        assert!(data.tracks.is_empty());
    }

    #[test]
    fn test_extensions_skipped() {
        let xml = r#"<gpx version="1.1"><trk><trkseg>
  <trkpt lat="35.0" lon="139.0">
    <ele>5</ele>
    <extensions>
      <gpxtpx:TrackPointExtension xmlns:gpxtpx="http://www.garmin.com/xmlschemas/TrackPointExtension/v1">
        <gpxtpx:hr>150</gpxtpx:hr>
      </gpxtpx:TrackPointExtension>
    </extensions>
  </trkpt>
</trkseg></trk></gpx>"#;
        let pts = parse_gpx(xml).unwrap().tracks[0].points();
        assert_eq!(pts.len(), 1);
        assert_eq!(pts[0].ele, Some(5.0));
    }

    #[test]
    fn test_cdata_track_name() {
        let xml = r#"<gpx version="1.1"><trk><name><![CDATA[Coast & Hills]]></name></trk></gpx>"#;
        let data = parse_gpx(xml).unwrap();
        assert_eq!(data.tracks[0].name.as_deref(), Some("Coast & Hills"));
    }

    #[test]
    fn test_missing_root_rejected() {
        let err = parse_gpx("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        let err = parse_gpx("<kml><trk/></kml>").unwrap_err();
        assert!(matches!(err, TrackError::MissingRoot));
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let err = parse_gpx("<gpx><trk><trkseg></trk></gpx>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_document_ending_inside_track_rejected() {
        let cut_after_point = r#"<gpx version="1.1"><trk><trkseg>
  <trkpt lat="0" lon="0"><ele>0</ele></trkpt>
  <trkpt lat="1" lon="1"><ele>1</ele></trkpt>"#;
        let err = parse_gpx(cut_after_point).unwrap_err();
        assert!(matches!(&err, TrackError::Truncated { element } if element == "trkseg"));
        assert_eq!(err.kind(), ErrorKind::Parse);

        let cut_inside_point = r#"<gpx version="1.1"><trk><trkseg><trkpt lat="0" lon="0">"#;
        assert!(matches!(
            parse_gpx(cut_inside_point),
            Err(TrackError::Truncated { element }) if element == "trkpt"
        ));

        let cut_after_track = r#"<gpx version="1.1"><trk><name>Loop</name>"#;
        assert!(matches!(
            parse_gpx(cut_after_track),
            Err(TrackError::Truncated { element }) if element == "trk"
        ));

        let unclosed_root = r#"<gpx version="1.1"><trk></trk>"#;
        assert!(matches!(
            parse_gpx(unclosed_root),
            Err(TrackError::Truncated { element }) if element == "gpx"
        ));
    }

    #[test]
    fn test_track_points_selection() {
        let xml = r#"<gpx version="1.1">
  <trk><trkseg><trkpt lat="1" lon="1"/></trkseg></trk>
  <trk><trkseg><trkpt lat="2" lon="2"/><trkpt lat="3" lon="3"/></trkseg></trk>
</gpx>"#;
        let data = parse_gpx(xml).unwrap();
        assert_eq!(track_points(&data, 0).unwrap().len(), 1);
        assert_eq!(track_points(&data, 1).unwrap().len(), 2);
        assert!(matches!(
            track_points(&data, 2),
            Err(TrackError::TrackIndexOutOfRange { index: 2, available: 2 })
        ));
    }

    #[test]
    fn test_no_tracks() {
        let data = parse_gpx(r#"<gpx version="1.1"/>"#).unwrap();
        assert!(matches!(track_points(&data, 0), Err(TrackError::NoTracks)));
    }
}
