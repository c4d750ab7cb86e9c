//! Association-graph mutation and traversal: BFS connectivity, shortest
//! path, and bounded-radius subgraph extraction.

use std::collections::{HashSet, VecDeque};

use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;
use cortex_core::memory::{Direction, GraphEdge, RelationshipType};
use cortex_core::ontology::is_symmetric;
use cortex_core::traits::{ConnectedNode, Subgraph};

use crate::to_storage_err;

pub fn add_relationship(conn: &Connection, edge: &GraphEdge) -> CortexResult<()> {
    insert_edge_row(conn, &edge.source_hash, &edge.target_hash, edge)?;
    if is_symmetric(edge.relationship_type) {
        insert_edge_row(conn, &edge.target_hash, &edge.source_hash, edge)?;
    }
    Ok(())
}

fn insert_edge_row(conn: &Connection, source: &str, target: &str, edge: &GraphEdge) -> CortexResult<()> {
    conn.execute(
        "INSERT INTO graph_edges (source_hash, target_hash, relationship_type, similarity, metadata)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(source_hash, target_hash, relationship_type) DO UPDATE SET
            similarity = excluded.similarity, metadata = excluded.metadata",
        params![
            source,
            target,
            relationship_type_str(edge.relationship_type),
            edge.similarity,
            serde_json::to_string(&edge.metadata).unwrap_or_default(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

fn relationship_type_str(r: RelationshipType) -> &'static str {
    match r {
        RelationshipType::Related => "related",
        RelationshipType::Contradicts => "contradicts",
        RelationshipType::Causes => "causes",
        RelationshipType::Fixes => "fixes",
        RelationshipType::Supports => "supports",
        RelationshipType::Opposes => "opposes",
        RelationshipType::Follows => "follows",
    }
}

/// Neighbors of `hash` one hop away, honoring `direction` and an optional
/// relationship-type filter.
fn neighbors(
    conn: &Connection,
    hash: &str,
    rel_type: Option<RelationshipType>,
    direction: Direction,
) -> CortexResult<Vec<String>> {
    let type_filter = rel_type.map(relationship_type_str);

    let mut out = Vec::new();
    if matches!(direction, Direction::Out | Direction::Both) {
        let mut stmt = conn
            .prepare(
                "SELECT graph_edges.target_hash, graph_edges.relationship_type
                 FROM graph_edges
                 JOIN memories m ON m.content_hash = graph_edges.target_hash
                 WHERE graph_edges.source_hash = ?1 AND m.deleted_at IS NULL",
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        let rows = stmt
            .query_map(params![hash], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))
            .map_err(|e| to_storage_err(e.to_string()))?;
        for row in rows {
            let (target, rt) = row.map_err(|e| to_storage_err(e.to_string()))?;
            if type_filter.map(|f| f == rt).unwrap_or(true) {
                out.push(target);
            }
        }
    }
    if matches!(direction, Direction::In | Direction::Both) {
        let mut stmt = conn
            .prepare(
                "SELECT graph_edges.source_hash, graph_edges.relationship_type
                 FROM graph_edges
                 JOIN memories m ON m.content_hash = graph_edges.source_hash
                 WHERE graph_edges.target_hash = ?1 AND m.deleted_at IS NULL",
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        let rows = stmt
            .query_map(params![hash], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))
            .map_err(|e| to_storage_err(e.to_string()))?;
        for row in rows {
            let (source, rt) = row.map_err(|e| to_storage_err(e.to_string()))?;
            if type_filter.map(|f| f == rt).unwrap_or(true) {
                out.push(source);
            }
        }
    }
    Ok(out)
}

pub fn find_connected(
    conn: &Connection,
    hash: &str,
    depth: usize,
    rel_type: Option<RelationshipType>,
    direction: Direction,
) -> CortexResult<Vec<ConnectedNode>> {
    let mut visited = HashSet::new();
    visited.insert(hash.to_string());
    let mut frontier = VecDeque::new();
    frontier.push_back((hash.to_string(), 0usize));
    let mut result = Vec::new();

    while let Some((current, dist)) = frontier.pop_front() {
        if dist >= depth {
            continue;
        }
        for next in neighbors(conn, &current, rel_type, direction)? {
            if visited.insert(next.clone()) {
                result.push(ConnectedNode { content_hash: next.clone(), distance: dist + 1 });
                frontier.push_back((next, dist + 1));
            }
        }
    }
    Ok(result)
}

pub fn shortest_path(
    conn: &Connection,
    a: &str,
    b: &str,
    rel_type: Option<RelationshipType>,
) -> CortexResult<Option<Vec<String>>> {
    if a == b {
        return Ok(Some(vec![a.to_string()]));
    }
    let mut visited = HashSet::new();
    visited.insert(a.to_string());
    let mut frontier = VecDeque::new();
    frontier.push_back(a.to_string());
    let mut parent: std::collections::HashMap<String, String> = std::collections::HashMap::new();

    while let Some(current) = frontier.pop_front() {
        for next in neighbors(conn, &current, rel_type, Direction::Both)? {
            if visited.insert(next.clone()) {
                parent.insert(next.clone(), current.clone());
                if next == b {
                    let mut path = vec![next.clone()];
                    let mut cursor = next;
                    while let Some(p) = parent.get(&cursor) {
                        path.push(p.clone());
                        cursor = p.clone();
                    }
                    path.reverse();
                    return Ok(Some(path));
                }
                frontier.push_back(next);
            }
        }
    }
    Ok(None)
}

pub fn get_subgraph(conn: &Connection, hash: &str, radius: usize) -> CortexResult<Subgraph> {
    let connected = find_connected(conn, hash, radius, None, Direction::Both)?;
    let mut hashes: Vec<String> = connected.iter().map(|c| c.content_hash.clone()).collect();
    hashes.push(hash.to_string());

    let mut nodes = Vec::new();
    for h in &hashes {
        if let Some(m) = super::memory_crud::get_by_hash(conn, h)?.filter(cortex_core::memory::Memory::is_live) {
            nodes.push(m);
        }
    }

    let mut edges = Vec::new();
    let hash_set: HashSet<&String> = hashes.iter().collect();
    let mut stmt = conn
        .prepare("SELECT source_hash, target_hash, relationship_type, similarity, metadata FROM graph_edges")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, f64>(3)?,
                r.get::<_, String>(4)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    for row in rows {
        let (source, target, rt, similarity, metadata) = row.map_err(|e| to_storage_err(e.to_string()))?;
        if hash_set.contains(&source) && hash_set.contains(&target) {
            edges.push(GraphEdge {
                source_hash: source,
                target_hash: target,
                relationship_type: parse_relationship_type(&rt),
                similarity,
                metadata: serde_json::from_str(&metadata).unwrap_or_default(),
            });
        }
    }

    Ok(Subgraph { nodes, edges })
}

fn parse_relationship_type(s: &str) -> RelationshipType {
    match s {
        "contradicts" => RelationshipType::Contradicts,
        "causes" => RelationshipType::Causes,
        "fixes" => RelationshipType::Fixes,
        "supports" => RelationshipType::Supports,
        "opposes" => RelationshipType::Opposes,
        "follows" => RelationshipType::Follows,
        _ => RelationshipType::Related,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;
    use cortex_core::memory::{Memory, MemoryType, Metadata};

    fn seed_with_edge(conn: &Connection) -> (String, String) {
        migrations::run_all(conn).unwrap();
        let m1 = Memory::new("a", "x", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        let m2 = Memory::new("b", "x", MemoryType::Observation, Metadata::new(), 2.0, vec![]);
        let h1 = m1.content_hash.clone();
        let h2 = m2.content_hash.clone();
        super::super::memory_crud::insert_memory(conn, &m1).unwrap();
        super::super::memory_crud::insert_memory(conn, &m2).unwrap();
        add_relationship(
            conn,
            &GraphEdge {
                source_hash: h1.clone(),
                target_hash: h2.clone(),
                relationship_type: RelationshipType::Causes,
                similarity: 0.9,
                metadata: Default::default(),
            },
        )
        .unwrap();
        (h1, h2)
    }

    #[test]
    fn asymmetric_edge_is_directional() {
        let conn = Connection::open_in_memory().unwrap();
        let (h1, h2) = seed_with_edge(&conn);
        let out = find_connected(&conn, &h1, 1, None, Direction::Out).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].content_hash, h2);

        let reverse = find_connected(&conn, &h2, 1, None, Direction::Out).unwrap();
        assert!(reverse.is_empty());
    }

    #[test]
    fn shortest_path_finds_direct_edge() {
        let conn = Connection::open_in_memory().unwrap();
        let (h1, h2) = seed_with_edge(&conn);
        let path = shortest_path(&conn, &h1, &h2, None).unwrap().unwrap();
        assert_eq!(path, vec![h1, h2]);
    }

    #[test]
    fn symmetric_relationship_stores_both_directions() {
        let conn = Connection::open_in_memory().unwrap();
        migrations::run_all(&conn).unwrap();
        let m1 = Memory::new("a", "x", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        let m2 = Memory::new("b", "x", MemoryType::Observation, Metadata::new(), 2.0, vec![]);
        let h1 = m1.content_hash.clone();
        let h2 = m2.content_hash.clone();
        super::super::memory_crud::insert_memory(&conn, &m1).unwrap();
        super::super::memory_crud::insert_memory(&conn, &m2).unwrap();
        add_relationship(
            &conn,
            &GraphEdge {
                source_hash: h1.clone(),
                target_hash: h2.clone(),
                relationship_type: RelationshipType::Related,
                similarity: 0.5,
                metadata: Default::default(),
            },
        )
        .unwrap();
        assert_eq!(find_connected(&conn, &h1, 1, None, Direction::Out).unwrap().len(), 1);
        assert_eq!(find_connected(&conn, &h2, 1, None, Direction::Out).unwrap().len(), 1);
    }
}
