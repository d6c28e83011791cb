//! Render handoff for the core network
//!
//! Writes the ranked core subgraph as GraphML with everything an external
//! renderer needs to draw it: node size, label and rank, and edge weight.

use anyhow::Result;
use crate::subgraph::RankedSubgraph;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Node size per unit of centrality score
pub const NODE_SIZE_SCALE: f64 = 20_000.0;

/// Display name for an address: local part, dots as spaces, title case.
///
/// `"john.arnold@enron.com"` becomes `"John Arnold"`.
pub fn display_label(id: &str) -> String {
    let local = id.split('@').next().unwrap_or(id).replace('.', " ");

    // Letters following another letter are lowercased, all others uppercased
    let mut label = String::with_capacity(local.len());
    let mut after_letter = false;
    for ch in local.chars() {
        if after_letter {
            label.extend(ch.to_lowercase());
        } else {
            label.extend(ch.to_uppercase());
        }
        after_letter = ch.is_alphabetic();
    }
    label
}

/// Escape text for use inside an XML attribute or element
fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Write the core subgraph as GraphML and return the file path
pub fn write_core_network(core: &RankedSubgraph, output_dir: &Path) -> Result<PathBuf> {
    log::info!(
        "Writing core network of {} nodes from community {}",
        core.members.len(),
        core.community
    );

    let path = output_dir.join("core_network.graphml");
    let mut file = BufWriter::new(File::create(&path)?);

    // Write GraphML header and attribute keys
    writeln!(file, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(file, "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">")?;
    writeln!(file, "  <key id=\"label\" for=\"node\" attr.name=\"label\" attr.type=\"string\"/>")?;
    writeln!(file, "  <key id=\"address\" for=\"node\" attr.name=\"address\" attr.type=\"string\"/>")?;
    writeln!(file, "  <key id=\"size\" for=\"node\" attr.name=\"size\" attr.type=\"double\"/>")?;
    writeln!(file, "  <key id=\"score\" for=\"node\" attr.name=\"score\" attr.type=\"double\"/>")?;
    writeln!(file, "  <key id=\"rank\" for=\"node\" attr.name=\"rank\" attr.type=\"int\"/>")?;
    writeln!(file, "  <key id=\"community\" for=\"node\" attr.name=\"community\" attr.type=\"int\"/>")?;
    writeln!(file, "  <key id=\"weight\" for=\"edge\" attr.name=\"weight\" attr.type=\"int\"/>")?;
    writeln!(file, "  <graph id=\"core\" edgedefault=\"directed\">")?;

    // Write nodes
    for (sub_idx, member) in core.members.iter().enumerate() {
        writeln!(file, "    <node id=\"n{}\">", sub_idx)?;
        if member.labeled {
            writeln!(file, "      <data key=\"label\">{}</data>", xml_escape(&display_label(&member.id)))?;
        }
        writeln!(file, "      <data key=\"address\">{}</data>", xml_escape(&member.id))?;
        writeln!(file, "      <data key=\"size\">{}</data>", member.score * NODE_SIZE_SCALE)?;
        writeln!(file, "      <data key=\"score\">{}</data>", member.score)?;
        writeln!(file, "      <data key=\"rank\">{}</data>", member.rank)?;
        writeln!(file, "      <data key=\"community\">{}</data>", core.community)?;
        writeln!(file, "    </node>")?;
    }

    // Write edges
    for (edge_id, (src, dst, weight)) in core.graph.edges().enumerate() {
        writeln!(
            file,
            "    <edge id=\"e{}\" source=\"n{}\" target=\"n{}\"><data key=\"weight\">{}</data></edge>",
            edge_id, src, dst, weight
        )?;
    }

    // Write GraphML footer
    writeln!(file, "  </graph>")?;
    writeln!(file, "</graphml>")?;
    file.flush()?;

    log::info!("Core network saved to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centrality::CentralityScores;
    use crate::cluster::CommunityPartition;
    use crate::graph::{build_graph, RawRecord};
    use crate::subgraph::rank_core_community;

    #[test]
    fn labels_follow_the_address_local_part() {
        assert_eq!(display_label("john.arnold@enron.com"), "John Arnold");
        assert_eq!(display_label("KEAN@enron.com"), "Kean");
        assert_eq!(display_label("mary-jo.o'neil"), "Mary-Jo O'Neil");
    }

    #[test]
    fn graphml_labels_only_flagged_nodes() {
        let records = vec![
            RawRecord::new("a.b@enron.com", "c.d@enron.com"),
            RawRecord::new("c.d@enron.com", "a.b@enron.com"),
        ];
        let graph = build_graph(&records).unwrap();
        let partition = CommunityPartition::from_labels(&[0, 0]);
        let scores = CentralityScores::new(vec![1.0, 0.5]);
        let core = rank_core_community(&graph, &partition, &scores, 2, 1).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = write_core_network(&core, dir.path()).unwrap();
        let xml = std::fs::read_to_string(path).unwrap();

        assert!(xml.contains("<data key=\"label\">A B</data>"));
        assert!(!xml.contains("<data key=\"label\">C D</data>"));
        assert!(xml.contains("<data key=\"size\">20000</data>"));
        assert_eq!(xml.matches("<edge ").count(), 2);
    }
}
