use cinder_shared::{BitReader, BitWriter, SerdeErr};

use crate::sync::{EntityType, NodeData, NodeKind, SyncNode};

const BASE_NODES: &[NodeKind] = &[NodeKind::Creation, NodeKind::Position, NodeKind::Script];
const PED_NODES: &[NodeKind] = &[
    NodeKind::Creation,
    NodeKind::Position,
    NodeKind::Script,
    NodeKind::Health,
    NodeKind::Velocity,
];
const PLAYER_NODES: &[NodeKind] = &[
    NodeKind::Creation,
    NodeKind::Position,
    NodeKind::Script,
    NodeKind::Health,
    NodeKind::Velocity,
    NodeKind::PlayerState,
];
const VEHICLE_NODES: &[NodeKind] = &[
    NodeKind::Creation,
    NodeKind::Position,
    NodeKind::Script,
    NodeKind::Velocity,
    NodeKind::Health,
];
const OBJECT_NODES: &[NodeKind] = &[
    NodeKind::Creation,
    NodeKind::Position,
    NodeKind::Script,
    NodeKind::Opaque,
];

/// Node layout of the sync tree for `entity_type`, in wire order.
pub fn node_kinds(entity_type: EntityType) -> &'static [NodeKind] {
    match entity_type {
        EntityType::Player => PLAYER_NODES,
        EntityType::Ped => PED_NODES,
        EntityType::Object
        | EntityType::Door
        | EntityType::Pickup
        | EntityType::PickupPlacement => OBJECT_NODES,
        entity_type if entity_type.is_vehicle() => VEHICLE_NODES,
        _ => BASE_NODES,
    }
}

/// A decoded but not yet applied update: one optional value per node of the
/// tree it was decoded against.
#[derive(Clone, Debug, PartialEq)]
pub struct StagedUpdate {
    nodes: Vec<Option<NodeData>>,
}

impl StagedUpdate {
    pub fn nodes(&self) -> &[Option<NodeData>] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(Option::is_none)
    }

    fn declared_type(&self) -> Option<u8> {
        self.nodes.iter().flatten().find_map(|data| match data {
            NodeData::Creation { entity_type, .. } => Some(*entity_type),
            _ => None,
        })
    }
}

/// The replicated state of one entity.
///
/// Each node on the wire is a presence bit followed, when set, by the
/// node's fields.
#[derive(Clone, Debug)]
pub struct SyncTree {
    entity_type: EntityType,
    nodes: Vec<SyncNode>,
}

impl SyncTree {
    pub fn new(entity_type: EntityType, max_clients: usize) -> Self {
        let nodes = node_kinds(entity_type)
            .iter()
            .map(|kind| SyncNode::new(*kind, max_clients))
            .collect();
        Self { entity_type, nodes }
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn nodes(&self) -> &[SyncNode] {
        &self.nodes
    }

    /// Decodes `data` against this tree's layout without touching its
    /// state. Trailing padding after the last node is ignored.
    pub fn decode(&self, data: &[u8]) -> Result<StagedUpdate, SerdeErr> {
        let mut reader = BitReader::new(data);
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if reader.read_bit()? {
                nodes.push(Some(node.kind().read(&mut reader)?));
            } else {
                nodes.push(None);
            }
        }
        Ok(StagedUpdate { nodes })
    }

    /// Whether `update` may be applied to this object: it must have been
    /// decoded against this layout, and a creation node in it must name
    /// this tree's entity type.
    pub fn can_apply_to_object(&self, update: &StagedUpdate) -> bool {
        if update.nodes.len() != self.nodes.len() {
            return false;
        }
        let kinds_match = update
            .nodes
            .iter()
            .zip(&self.nodes)
            .all(|(staged, node)| staged.as_ref().map_or(true, |data| data.kind() == node.kind()));

        kinds_match
            && update
                .declared_type()
                .map_or(true, |declared| declared == self.entity_type.to_bits())
    }

    /// Copies every present node of `update` into the tree, stamping changed
    /// nodes with `frame`.
    pub fn apply(&mut self, update: StagedUpdate, frame: u32) {
        for (node, staged) in self.nodes.iter_mut().zip(update.nodes) {
            if let Some(data) = staged {
                node.set_data(data, frame);
            }
        }
    }

    /// Writes the nodes selected by `include` (and holding data). Returns
    /// whether any node was written.
    pub fn write(&self, writer: &mut BitWriter, include: impl Fn(&SyncNode) -> bool) -> bool {
        let mut wrote = false;
        for node in &self.nodes {
            match node.data() {
                Some(data) if include(node) => {
                    writer.write(1, 1);
                    data.write(writer);
                    wrote = true;
                }
                _ => writer.write(1, 0),
            }
        }
        wrote
    }

    /// Runs `visitor` on every node.
    pub fn visit(&mut self, mut visitor: impl FnMut(&mut SyncNode)) {
        for node in &mut self.nodes {
            visitor(node);
        }
    }

    pub fn position(&self) -> Option<(f32, f32, f32)> {
        self.nodes.iter().find_map(|node| match node.data() {
            Some(NodeData::Position { x, y, z }) => Some((*x, *y, *z)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(tree: &SyncTree, values: &[Option<NodeData>]) -> Vec<u8> {
        let mut writer = BitWriter::new();
        for (node, value) in tree.nodes().iter().zip(values) {
            match value {
                Some(data) => {
                    assert_eq!(data.kind(), node.kind());
                    writer.write(1, 1);
                    data.write(&mut writer);
                }
                None => writer.write(1, 0),
            }
        }
        writer.to_bytes()
    }

    #[test]
    fn layouts_per_type() {
        assert_eq!(node_kinds(EntityType::Player).len(), 6);
        assert_eq!(node_kinds(EntityType::Automobile), VEHICLE_NODES);
        assert!(node_kinds(EntityType::Door).contains(&NodeKind::Opaque));
        assert!(!node_kinds(EntityType::Ped).contains(&NodeKind::PlayerState));
    }

    #[test]
    fn decode_and_apply() {
        let mut tree = SyncTree::new(EntityType::Ped, 8);
        let data = encode(
            &tree,
            &[
                None,
                Some(NodeData::Position {
                    x: 1.0,
                    y: 2.0,
                    z: 3.0,
                }),
                None,
                None,
                None,
            ],
        );

        let update = tree.decode(&data).unwrap();
        assert!(tree.can_apply_to_object(&update));
        assert!(tree.position().is_none());

        tree.apply(update, 7);
        assert_eq!(tree.position(), Some((1.0, 2.0, 3.0)));
        assert_eq!(tree.nodes()[1].changed_frame(), 7);
    }

    #[test]
    fn creation_node_must_match_type() {
        let tree = SyncTree::new(EntityType::Automobile, 8);
        let data = encode(
            &tree,
            &[
                Some(NodeData::Creation {
                    entity_type: EntityType::Boat.to_bits(),
                    model_hash: 0x1234,
                }),
                None,
                None,
                None,
                None,
            ],
        );

        let update = tree.decode(&data).unwrap();
        assert!(!tree.can_apply_to_object(&update));
    }

    #[test]
    fn update_from_another_layout_is_refused() {
        let ped = SyncTree::new(EntityType::Ped, 8);
        let object = SyncTree::new(EntityType::Object, 8);
        let update = ped.decode(&[0]).unwrap();

        assert!(ped.can_apply_to_object(&update));
        assert!(!object.can_apply_to_object(&update));
    }

    #[test]
    fn write_selects_nodes() {
        let mut tree = SyncTree::new(EntityType::Object, 2);
        let update = tree
            .decode(&encode(
                &tree,
                &[
                    None,
                    Some(NodeData::Position {
                        x: 0.0,
                        y: 0.0,
                        z: 0.0,
                    }),
                    Some(NodeData::Script { script_hash: None }),
                    None,
                ],
            ))
            .unwrap();
        tree.apply(update, 1);
        tree.visit(|node| {
            if node.kind() == NodeKind::Position {
                node.ack(0, 1);
            }
        });

        let mut writer = BitWriter::new();
        assert!(tree.write(&mut writer, |node| !node.is_acked_by(0)));
        let written = tree.decode(&writer.to_bytes()).unwrap();
        assert_eq!(
            written.nodes(),
            &[None, None, Some(NodeData::Script { script_hash: None }), None]
        );

        let mut writer = BitWriter::new();
        assert!(!tree.write(&mut writer, |_| false));
    }
}
