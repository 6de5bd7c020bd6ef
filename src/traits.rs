/// Boolean operations shared by [`Solid`](crate::Solid) and
/// [`Cag`](crate::Cag).
///
/// The `*_all` forms take any number of operands and are the primitives;
/// the binary forms are conveniences on top of them.
pub trait BooleanOps: Sized + Clone {
    /// `Self` for infallible operations, a `Result` where converting back from
    /// the 3D representation can fail.
    type Output;

    /// Union of `self` with every operand in `others`.
    ///
    /// ```text
    /// let c = a.union(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |       +----+
    ///     +----+--+    |       +----+       |
    ///          |   b   |            |   c   |
    ///          |       |            |       |
    ///          +-------+            +-------+
    /// ```
    fn union_all(&self, others: &[Self]) -> Self::Output;

    /// `self` minus every operand in `others`, applied in order.
    ///
    /// ```text
    /// let c = a.subtract(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |    +--+
    ///     +----+--+    |       +----+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    fn subtract_all(&self, others: &[Self]) -> Self::Output;

    /// Intersection of `self` with every operand in `others`, applied in order.
    ///
    /// ```text
    /// let c = a.intersect(b);
    ///     +-------+
    ///     |       |
    ///     |   a   |
    ///     |    +--+----+   =   +--+
    ///     +----+--+    |       +--+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    fn intersect_all(&self, others: &[Self]) -> Self::Output;

    fn union(&self, other: &Self) -> Self::Output {
        self.union_all(std::slice::from_ref(other))
    }

    fn subtract(&self, other: &Self) -> Self::Output {
        self.subtract_all(std::slice::from_ref(other))
    }

    fn intersect(&self, other: &Self) -> Self::Output {
        self.intersect_all(std::slice::from_ref(other))
    }
}
