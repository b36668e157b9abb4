use geo::Coord;
use itertools::Itertools;

use crate::station_tree::StationTree;

use super::template::escape_xml;

const ROOT_HALF_SIZE: f64 = 6.0;
const STATION_HALF_SIZE: f64 = 2.0;
const LABEL_OFFSET: Coord = Coord { x: 5.0, y: -15.0 };
const LABEL_FONT_SIZE: u32 = 15;
const MARKER_RADIUS: f64 = 3.0;

/// Schematic of the station tree with train markers on top, as an SVG document
pub fn station_map_svg(tree: &StationTree, markers: &[Coord], width: u32, height: u32) -> String {
    let root = tree.root();

    let edges = tree
        .edges()
        .into_iter()
        .map(|(parent, child)| {
            let from = tree.node(parent).position;
            let to = tree.node(child).position;
            format!(
                r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="black" stroke-width="1"/>"#,
                from.x, from.y, to.x, to.y
            )
        })
        .join("\n");

    let stations = tree
        .nodes()
        .iter()
        .enumerate()
        .map(|(id, node)| {
            let half = if Some(id) == root {
                ROOT_HALF_SIZE
            } else {
                STATION_HALF_SIZE
            };
            let p = node.position;
            format!(
                concat!(
                    r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="black"/>"#,
                    "\n",
                    r#"<text x="{:.1}" y="{:.1}" font-family="IBM Plex Sans, sans-serif" font-size="{}">{}</text>"#
                ),
                p.x - half,
                p.y - half,
                half * 2.0,
                half * 2.0,
                p.x + LABEL_OFFSET.x,
                p.y + LABEL_OFFSET.y,
                LABEL_FONT_SIZE,
                escape_xml(&node.code)
            )
        })
        .join("\n");

    let trains = markers
        .iter()
        .map(|p| {
            format!(
                r#"<circle cx="{:.1}" cy="{:.1}" r="{}" fill="black"/>"#,
                p.x, p.y, MARKER_RADIUS
            )
        })
        .join("\n");

    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            "\n",
            r#"<rect width="{w}" height="{h}" fill="white"/>"#,
            "\n{edges}\n{stations}\n{trains}\n</svg>\n"
        ),
        w = width,
        h = height,
        edges = edges,
        stations = stations,
        trains = trains,
    )
}
