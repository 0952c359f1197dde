//! Feature sets eligible for a tool within a group.

use super::tool::accepted_kinds_for;
use crate::data::AnnotationIndex;

/// Feature sets of `group` that `tool` can analyse, in pass order.
///
/// For each kind the tool accepts (in policy order) the matching feature sets
/// are appended in annotation order, so a gene-and-region tool sees every gene
/// list before any region set. Unknown tools and unknown groups yield an
/// empty list.
pub fn resolve(index: &AnnotationIndex, group: &str, tool: &str) -> Vec<String> {
    let members = index.records_in_group(group);

    accepted_kinds_for(tool)
        .iter()
        .flat_map(|&kind| {
            members
                .iter()
                .filter(move |r| r.kind() == kind)
                .map(|r| r.name.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(rows: &str) -> AnnotationIndex {
        let data = format!("name,group,features_path\n{}", rows);
        AnnotationIndex::from_reader(data.as_bytes()).unwrap()
    }

    #[test]
    fn test_gene_before_region() {
        let idx = index("g1,grp,g1.txt\ng2,grp,g2.bed\n");
        assert_eq!(resolve(&idx, "grp", "ORA_GSEApy"), vec!["g1", "g2"]);
    }

    #[test]
    fn test_two_pass_ordering_not_interleaved() {
        let idx = index(
            "r1,grp,r1.bed\ng1,grp,g1.txt\nr2,grp,r2.bed\nk1,grp,k1.csv\ng2,grp,g2.txt\nx1,other,x1.txt\n",
        );
        let expected = vec!["g1", "g2", "r1", "r2"];
        assert_eq!(resolve(&idx, "grp", "ORA_GSEApy"), expected);
        assert_eq!(resolve(&idx, "grp", "RcisTarget"), expected);
    }

    #[test]
    fn test_region_only_tools() {
        let idx = index("r1,grp,r1.bed\ng1,grp,g1.txt\nr2,grp,r2.bed\n");
        for tool in ["GREAT", "LOLA", "pycisTarget"] {
            assert_eq!(resolve(&idx, "grp", tool), vec!["r1", "r2"], "{}", tool);
        }
    }

    #[test]
    fn test_preranked() {
        let idx = index("r1,grp,r1.bed\nk1,grp,k1.csv\ng1,grp,g1.txt\n");
        assert_eq!(resolve(&idx, "grp", "preranked_GSEApy"), vec!["k1"]);
    }

    #[test]
    fn test_unknown_tool_or_group_is_empty() {
        let idx = index("g1,grp,g1.txt\n");
        assert!(resolve(&idx, "grp", "HOMER").is_empty());
        assert!(resolve(&idx, "nope", "ORA_GSEApy").is_empty());
        assert!(resolve(&idx, "grp", "GREAT").is_empty());
    }
}
