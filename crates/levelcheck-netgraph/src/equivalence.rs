//! Union-find over global net ids (C6), collapsing nets shorted together
//! by a zero-resistance resistor or capacitor. Every later reference to
//! "net N" in the connectivity index and propagation engine means "the
//! representative of N".

use levelcheck_core::NetId;

/// A frozen union-find result: representatives are computed once after all
/// unions are applied, so lookups afterward never need `&mut self` (the
/// distilled spec's "no failure modes at query time" for C6 extends to
/// "no mutation needed at query time" here).
#[derive(Debug)]
pub struct EquivalenceClasses {
    representative: Vec<NetId>,
}

impl EquivalenceClasses {
    /// Build the identity partition over `net_count` nets.
    pub fn identity(net_count: usize) -> Self {
        Self { representative: (0..net_count as u32).map(NetId::new).collect() }
    }

    fn find_mut(parents: &mut [NetId], net: NetId) -> NetId {
        let mut root = net;
        while parents[root.as_usize()] != root {
            root = parents[root.as_usize()];
        }
        let mut cursor = net;
        while parents[cursor.as_usize()] != root {
            let next = parents[cursor.as_usize()];
            parents[cursor.as_usize()] = root;
            cursor = next;
        }
        root
    }

    /// Merge the classes of `a` and `b`. Idempotent: unioning already-
    /// equivalent nets is a no-op.
    pub fn union(&mut self, a: NetId, b: NetId) {
        let ra = Self::find_mut(&mut self.representative, a);
        let rb = Self::find_mut(&mut self.representative, b);
        if ra != rb {
            // Lower id wins so the representative is deterministic
            // regardless of union order.
            let (keep, drop) = if ra.as_u32() < rb.as_u32() { (ra, rb) } else { (rb, ra) };
            self.representative[drop.as_usize()] = keep;
        }
    }

    /// The representative of `net`'s equivalence class. Idempotent:
    /// `equivalent(equivalent(n)) == equivalent(n)`.
    pub fn equivalent(&self, net: NetId) -> NetId {
        let mut root = net;
        while self.representative[root.as_usize()] != root {
            root = self.representative[root.as_usize()];
        }
        root
    }

    pub fn is_representative(&self, net: NetId) -> bool {
        self.representative[net.as_usize()] == net
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrelated_nets_are_their_own_representative() {
        let classes = EquivalenceClasses::identity(4);
        assert_eq!(classes.equivalent(NetId::new(2)), NetId::new(2));
    }

    #[test]
    fn union_collapses_to_lower_id() {
        let mut classes = EquivalenceClasses::identity(4);
        classes.union(NetId::new(3), NetId::new(1));
        assert_eq!(classes.equivalent(NetId::new(3)), NetId::new(1));
        assert_eq!(classes.equivalent(NetId::new(1)), NetId::new(1));
    }

    #[test]
    fn equivalence_is_idempotent() {
        let mut classes = EquivalenceClasses::identity(5);
        classes.union(NetId::new(0), NetId::new(1));
        classes.union(NetId::new(1), NetId::new(2));
        let rep = classes.equivalent(NetId::new(2));
        assert_eq!(classes.equivalent(rep), rep);
    }

    #[test]
    fn chained_unions_share_one_representative() {
        let mut classes = EquivalenceClasses::identity(5);
        classes.union(NetId::new(0), NetId::new(1));
        classes.union(NetId::new(2), NetId::new(3));
        classes.union(NetId::new(1), NetId::new(2));
        let rep = classes.equivalent(NetId::new(3));
        assert_eq!(classes.equivalent(NetId::new(0)), rep);
        assert_eq!(classes.equivalent(NetId::new(1)), rep);
        assert_eq!(classes.equivalent(NetId::new(2)), rep);
    }
}
