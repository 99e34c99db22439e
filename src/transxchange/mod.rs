//! Stop sequences from TransXChange timetable files.
//!
//! A route's stops are recovered by following a journey pattern's section
//! references to their timing links and reading each link's `From` and `To`
//! stop points, in document order.
pub mod direction;

use log::{debug, info};
use roxmltree::{Document, Node};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::timetable::stops::Stop;
use direction::{Direction, DirectionClassifier};

pub const TXC_NAMESPACE: &str = "http://www.transxchange.org.uk/";

#[derive(Debug, thiserror::Error)]
pub enum TransXChangeError {
    #[error("Failed to read {0}: {1}")]
    FailedToRead(String, #[source] io::Error),
    #[error("Failed to parse {0}: {1}")]
    FailedToParse(String, #[source] roxmltree::Error),
}

// timetable_path is where the timetable for `route_name` is expected in `dir`.
pub fn timetable_path(dir: &Path, route_name: &str) -> PathBuf {
    dir.join(format!("timetable-{}.xml", route_name))
}

// load_stops reads `timetable-<route_name>.xml` from `dir` and extracts the
// stop sequence for one direction of the route.
pub fn load_stops(
    dir: &Path,
    route_name: &str,
    direction: Direction,
    classifier: &DirectionClassifier,
) -> Result<Vec<Stop>, TransXChangeError> {
    let path = timetable_path(dir, route_name);
    let xml = fs::read_to_string(&path)
        .map_err(|e| TransXChangeError::FailedToRead(path.display().to_string(), e))?;
    let document = Document::parse(&xml)
        .map_err(|e| TransXChangeError::FailedToParse(path.display().to_string(), e))?;
    Ok(Timetable::new(&document).stops_for(route_name, direction, classifier))
}

// extract_stops is load_stops for a document already in memory.
pub fn extract_stops(
    xml: &str,
    route_name: &str,
    direction: Direction,
    classifier: &DirectionClassifier,
) -> Result<Vec<Stop>, TransXChangeError> {
    let document = Document::parse(xml)
        .map_err(|e| TransXChangeError::FailedToParse(String::from("document"), e))?;
    Ok(Timetable::new(&document).stops_for(route_name, direction, classifier))
}

fn is_txc<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> bool {
    node.has_tag_name((TXC_NAMESPACE, name))
}

fn txc_descendants<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants().filter(move |n| is_txc(n, name))
}

fn txc_child<'a, 'input: 'a>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_txc(n, name))
}

fn txc_text<'a, 'input: 'a>(node: Option<Node<'a, 'input>>) -> Option<&'a str> {
    node.and_then(|n| n.text()).map(str::trim)
}

// StopSequence collects stops in first-seen order, ignoring any code it has
// already collected.
#[derive(Debug, Default)]
struct StopSequence {
    stops: Vec<Stop>,
    seen: HashSet<String>,
}

impl StopSequence {
    fn push(&mut self, code: &str, name: &str) {
        if self.seen.insert(code.to_string()) {
            self.stops.push(Stop::with_code(name, code));
        }
    }
}

struct Timetable<'a, 'input> {
    root: Node<'a, 'input>,
    // StopPointRef -> CommonName
    stop_points: HashMap<&'a str, &'a str>,
}

impl<'a, 'input: 'a> Timetable<'a, 'input> {
    fn new(document: &'a Document<'input>) -> Self {
        let root = document.root_element();
        let stop_points = txc_descendants(root, "AnnotatedStopPointRef")
            .filter_map(|annotated| {
                let code = txc_text(txc_child(annotated, "StopPointRef"))?;
                let name = txc_text(txc_child(annotated, "CommonName"))?;
                Some((code, name))
            })
            .collect::<HashMap<_, _>>();
        info!("Found {} total stops in XML", stop_points.len());
        Timetable { root, stop_points }
    }

    fn stops_for(
        &self,
        route_name: &str,
        direction: Direction,
        classifier: &DirectionClassifier,
    ) -> Vec<Stop> {
        let services = txc_descendants(self.root, "Service").filter(|service| {
            txc_descendants(*service, "LineName").any(|line| txc_text(Some(line)) == Some(route_name))
        });

        for service in services {
            info!("Found service for route {}", route_name);
            for journey_pattern in txc_descendants(service, "JourneyPattern") {
                let direction_text = match txc_text(txc_descendants(journey_pattern, "Direction").next()) {
                    Some(text) => text,
                    None => continue,
                };
                debug!(
                    "Found direction: {} (reads as {})",
                    direction_text,
                    classifier.classify(direction_text)
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| String::from("unknown"))
                );
                if !classifier.matches(direction_text, direction) {
                    continue;
                }
                debug!("Matched direction {} with {}", direction, direction_text);

                let stops = self.journey_pattern_stops(journey_pattern);
                if !stops.is_empty() {
                    info!("Found {} stops for {}", stops.len(), direction);
                    return stops;
                }
            }
        }
        Vec::new()
    }

    fn journey_pattern_stops(&self, journey_pattern: Node<'a, 'input>) -> Vec<Stop> {
        let mut sequence = StopSequence::default();
        // singular and plural refs may be mixed; keep document order
        let section_ids = journey_pattern.descendants()
            .filter(|n| is_txc(n, "JourneyPatternSectionRef") || is_txc(n, "JourneyPatternSectionRefs"))
            .filter_map(|section_ref| txc_text(Some(section_ref)));

        for section_id in section_ids {
            let sections = txc_descendants(self.root, "JourneyPatternSection")
                .filter(|section| section.attribute("id") == Some(section_id));
            for section in sections {
                for link in txc_descendants(section, "JourneyPatternTimingLink") {
                    for end in ["From", "To"] {
                        let code = txc_descendants(link, end)
                            .next()
                            .and_then(|n| txc_text(txc_child(n, "StopPointRef")));
                        if let Some((code, name)) = code.and_then(|code| {
                            self.stop_points.get(code).map(|name| (code, *name))
                        }) {
                            sequence.push(code, name);
                        }
                    }
                }
            }
        }
        sequence.stops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X90: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/timetable-X90.xml"));

    fn stops(route: &str, direction: Direction) -> Vec<Stop> {
        extract_stops(X90, route, direction, &DirectionClassifier::default()).unwrap()
    }

    fn codes(stops: &[Stop]) -> Vec<&str> {
        stops.iter().filter_map(|s| s.code.as_deref()).collect()
    }

    #[test]
    fn outbound_follows_sections_in_order_without_duplicates() {
        let outbound = stops("X90", Direction::Outbound);
        assert_eq!(
            codes(&outbound),
            vec!["340000004H5", "340001903OUT", "340002070IN", "490000138MA", "490000252VA"]
        );
        assert_eq!(outbound[0].name, "Gloucester Green");
        assert_eq!(outbound[2].name, "Thornhill Park & Ride");
    }

    #[test]
    fn inbound_uses_its_own_journey_pattern() {
        let inbound = stops("X90", Direction::Inbound);
        assert_eq!(codes(&inbound), vec!["490000252VA", "490000138MA", "340000004H5"]);
    }

    #[test]
    fn only_services_for_the_requested_line_are_used() {
        assert_eq!(
            codes(&stops("X5", Direction::Outbound)),
            vec!["490000252VA", "490000138MA", "340000004H5"]
        );
        assert!(stops("X5", Direction::Inbound).is_empty());
        assert!(stops("X99", Direction::Outbound).is_empty());
    }

    #[test]
    fn singular_and_plural_section_refs_are_followed_in_document_order() {
        assert_eq!(
            codes(&stops("X91", Direction::Outbound)),
            vec!["340002070IN", "490000138MA", "490000252VA", "340000004H5", "340001903OUT"]
        );
        let inbound = stops("X91", Direction::Inbound);
        assert_eq!(codes(&inbound), vec!["490000252VA", "490000138MA", "340000004H5"]);
        assert_eq!(inbound[0].name, "Victoria Coach Station");
    }

    #[test]
    fn custom_terms_change_which_pattern_matches() {
        let classifier = DirectionClassifier::new(&direction::DirectionTerms {
            inbound: vec![String::from("outbound")],
            outbound: vec![String::from("inbound")],
        });
        let swapped = extract_stops(X90, "X90", Direction::Inbound, &classifier).unwrap();
        assert_eq!(swapped.len(), 5);
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let result = extract_stops("<TransXChange>", "X90", Direction::Inbound, &DirectionClassifier::default());
        assert!(matches!(result, Err(TransXChangeError::FailedToParse(_, _))));
    }

    #[test]
    fn load_stops_reads_named_file() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata");
        let loaded = load_stops(&dir, "X90", Direction::Inbound, &DirectionClassifier::default()).unwrap();
        assert_eq!(loaded.len(), 3);
        assert!(matches!(
            load_stops(&dir, "X1", Direction::Inbound, &DirectionClassifier::default()),
            Err(TransXChangeError::FailedToRead(_, _))
        ));
    }
}
