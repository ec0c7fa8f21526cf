use super::classify::FragmentClass;
use super::split::Operand;

/// The type of boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Subtract,
    Intersect,
}

/// Decision about whether to keep a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepDecision {
    Keep,
    KeepFlipped,
    Discard,
}

/// Determines whether a fragment should be kept based on its classification
/// relative to the other solid and the boolean operation.
///
/// | Fragment | vs other solid | Union   | Subtract(A-B) | Intersect |
/// |----------|----------------|---------|---------------|-----------|
/// | from A   | Outside        | keep    | keep          | discard   |
/// | from A   | Inside         | discard | discard       | keep      |
/// | from A   | OnSame         | keep    | discard       | keep      |
/// | from A   | OnOpposite     | discard | keep          | discard   |
/// | from B   | Outside        | keep    | discard       | discard   |
/// | from B   | Inside         | discard | keep (flip)   | keep      |
/// | from B   | On*            | discard | discard       | discard   |
///
/// Coincident boundary is always taken from A, so B's copy of it never
/// survives.
#[allow(clippy::match_same_arms)]
#[must_use]
pub fn select(source: Operand, class: FragmentClass, op: BooleanOp) -> KeepDecision {
    use FragmentClass::{Inside, OnOpposite, OnSame, Outside};
    match (source, class, op) {
        (Operand::A, Outside, BooleanOp::Union | BooleanOp::Subtract) => KeepDecision::Keep,
        (Operand::A, Outside, BooleanOp::Intersect) => KeepDecision::Discard,

        (Operand::A, Inside, BooleanOp::Intersect) => KeepDecision::Keep,
        (Operand::A, Inside, BooleanOp::Union | BooleanOp::Subtract) => KeepDecision::Discard,

        (Operand::A, OnSame, BooleanOp::Union | BooleanOp::Intersect) => KeepDecision::Keep,
        (Operand::A, OnSame, BooleanOp::Subtract) => KeepDecision::Discard,

        (Operand::A, OnOpposite, BooleanOp::Subtract) => KeepDecision::Keep,
        (Operand::A, OnOpposite, BooleanOp::Union | BooleanOp::Intersect) => {
            KeepDecision::Discard
        }

        (Operand::B, Outside, BooleanOp::Union) => KeepDecision::Keep,
        (Operand::B, Outside, BooleanOp::Subtract | BooleanOp::Intersect) => {
            KeepDecision::Discard
        }

        (Operand::B, Inside, BooleanOp::Subtract) => KeepDecision::KeepFlipped,
        (Operand::B, Inside, BooleanOp::Intersect) => KeepDecision::Keep,
        (Operand::B, Inside, BooleanOp::Union) => KeepDecision::Discard,

        (Operand::B, OnSame | OnOpposite, _) => KeepDecision::Discard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_keeps_outside_fragments() {
        assert_eq!(
            select(Operand::A, FragmentClass::Outside, BooleanOp::Union),
            KeepDecision::Keep
        );
        assert_eq!(
            select(Operand::B, FragmentClass::Outside, BooleanOp::Union),
            KeepDecision::Keep
        );
        assert_eq!(
            select(Operand::B, FragmentClass::Inside, BooleanOp::Union),
            KeepDecision::Discard
        );
    }

    #[test]
    fn subtract_flips_b_inside() {
        assert_eq!(
            select(Operand::B, FragmentClass::Inside, BooleanOp::Subtract),
            KeepDecision::KeepFlipped
        );
        assert_eq!(
            select(Operand::B, FragmentClass::Outside, BooleanOp::Subtract),
            KeepDecision::Discard
        );
    }

    #[test]
    fn coincident_boundary_comes_from_a() {
        for op in [BooleanOp::Union, BooleanOp::Subtract, BooleanOp::Intersect] {
            for class in [FragmentClass::OnSame, FragmentClass::OnOpposite] {
                assert_eq!(select(Operand::B, class, op), KeepDecision::Discard);
            }
        }
        assert_eq!(
            select(Operand::A, FragmentClass::OnSame, BooleanOp::Union),
            KeepDecision::Keep
        );
        assert_eq!(
            select(Operand::A, FragmentClass::OnOpposite, BooleanOp::Subtract),
            KeepDecision::Keep
        );
        assert_eq!(
            select(Operand::A, FragmentClass::OnOpposite, BooleanOp::Intersect),
            KeepDecision::Discard
        );
    }

    #[test]
    fn intersect_keeps_only_inside() {
        assert_eq!(
            select(Operand::A, FragmentClass::Inside, BooleanOp::Intersect),
            KeepDecision::Keep
        );
        assert_eq!(
            select(Operand::A, FragmentClass::Outside, BooleanOp::Intersect),
            KeepDecision::Discard
        );
        assert_eq!(
            select(Operand::B, FragmentClass::Inside, BooleanOp::Intersect),
            KeepDecision::Keep
        );
    }
}
