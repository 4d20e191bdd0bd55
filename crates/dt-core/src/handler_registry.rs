//! Generic `TypeIdentifier -> (Decoder, Processor)` registry (§4.3), used in
//! three flavors: validated voucher types, revalidator types, and voucher
//! result types.

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;

use dt_protocol::TypeIdentifier;

use crate::error::{Error, Result};

/// Reconstructs a typed value of `T` from opaque bytes.
pub type Decoder<T> = Arc<dyn Fn(&[u8]) -> Result<Box<T>> + Send + Sync>;

struct Entry<T: ?Sized, P> {
    decoder: Decoder<T>,
    processor: P,
}

/// A `TypeIdentifier -> (Decoder, Processor)` map that iterates in
/// registration order. `T` is the decoded value's trait object (`dyn
/// Voucher` or `dyn VoucherResult`); `P` is the application callback type
/// (e.g. `Arc<dyn RequestValidator>`, or `()` when a flavor has no
/// processor, as with voucher result types).
pub struct HandlerRegistry<T: ?Sized, P> {
    order: Vec<TypeIdentifier>,
    entries: HashMap<TypeIdentifier, Entry<T, P>>,
}

impl<T: ?Sized, P> Default for HandlerRegistry<T, P> {
    fn default() -> Self {
        HandlerRegistry {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }
}

impl<T: ?Sized, P> HandlerRegistry<T, P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        type_id: TypeIdentifier,
        decoder: Decoder<T>,
        processor: P,
    ) -> Result<()> {
        if type_id.is_empty() {
            return Err(Error::NotRegisterable(
                "the empty type identifier is reserved".into(),
            ));
        }
        if self.entries.contains_key(&type_id) {
            return Err(Error::AlreadyRegistered(type_id.to_string()));
        }
        self.order.push(type_id.clone());
        self.entries.insert(type_id, Entry { decoder, processor });
        Ok(())
    }

    pub fn decoder(&self, type_id: &TypeIdentifier) -> Option<Decoder<T>> {
        self.entries.get(type_id).map(|e| e.decoder.clone())
    }

    pub fn is_registered(&self, type_id: &TypeIdentifier) -> bool {
        self.entries.contains_key(type_id)
    }

    /// Visits every registration in the order it was made, stopping as soon
    /// as `f` returns [`ControlFlow::Break`]. This is how "first handler
    /// that claims the event wins" is implemented for revalidators, without
    /// overloading the error channel the way the source's `ErrStopProcessing`
    /// sentinel does.
    pub fn each<B>(
        &self,
        mut f: impl FnMut(&TypeIdentifier, &P) -> ControlFlow<B>,
    ) -> Option<B> {
        for type_id in &self.order {
            let entry = self.entries.get(type_id).expect("order/entries in sync");
            if let ControlFlow::Break(b) = f(type_id, &entry.processor) {
                return Some(b);
            }
        }
        None
    }
}

impl<T: ?Sized, P: Clone> HandlerRegistry<T, P> {
    pub fn processor(&self, type_id: &TypeIdentifier) -> Option<P> {
        self.entries.get(type_id).map(|e| e.processor.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_decode_round_trip() {
        let mut registry: HandlerRegistry<Vec<u8>, ()> = HandlerRegistry::new();
        registry
            .register(
                "raw".into(),
                Arc::new(|bytes: &[u8]| Ok(Box::new(bytes.to_vec()))),
                (),
            )
            .unwrap();
        let decoder = registry.decoder(&"raw".into()).unwrap();
        let decoded = decoder(&[1, 2, 3]).unwrap();
        assert_eq!(*decoded, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry: HandlerRegistry<Vec<u8>, ()> = HandlerRegistry::new();
        registry
            .register("t".into(), Arc::new(|b: &[u8]| Ok(Box::new(b.to_vec()))), ())
            .unwrap();
        let err = registry
            .register("t".into(), Arc::new(|b: &[u8]| Ok(Box::new(b.to_vec()))), ())
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyRegistered(_)));
    }

    #[test]
    fn empty_type_identifier_is_not_registerable() {
        let mut registry: HandlerRegistry<Vec<u8>, ()> = HandlerRegistry::new();
        let err = registry
            .register("".into(), Arc::new(|b: &[u8]| Ok(Box::new(b.to_vec()))), ())
            .unwrap_err();
        assert!(matches!(err, Error::NotRegisterable(_)));
    }

    #[test]
    fn each_stops_at_first_claim() {
        let mut registry: HandlerRegistry<Vec<u8>, i32> = HandlerRegistry::new();
        registry
            .register("a".into(), Arc::new(|b: &[u8]| Ok(Box::new(b.to_vec()))), 1)
            .unwrap();
        registry
            .register("b".into(), Arc::new(|b: &[u8]| Ok(Box::new(b.to_vec()))), 2)
            .unwrap();

        let mut visited = Vec::new();
        let claimed = registry.each(|id, processor| {
            visited.push(id.to_string());
            if *processor == 1 {
                ControlFlow::Break(*processor)
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(claimed, Some(1));
        assert_eq!(visited, vec!["a"]);
    }

    #[test]
    fn each_visits_in_registration_order_when_nothing_claims() {
        let mut registry: HandlerRegistry<Vec<u8>, i32> = HandlerRegistry::new();
        registry
            .register("a".into(), Arc::new(|b: &[u8]| Ok(Box::new(b.to_vec()))), 1)
            .unwrap();
        registry
            .register("b".into(), Arc::new(|b: &[u8]| Ok(Box::new(b.to_vec()))), 2)
            .unwrap();

        let mut visited = Vec::new();
        let claimed: Option<()> = registry.each(|id, _| {
            visited.push(id.to_string());
            ControlFlow::Continue(())
        });
        assert_eq!(claimed, None);
        assert_eq!(visited, vec!["a", "b"]);
    }
}
