use vt_types::{Price, Product};

pub const PROMOTION_CEILING: f64 = 200.0;

pub trait Priced {
    fn price(&self) -> &Price;
}

impl Priced for Product {
    fn price(&self) -> &Price {
        &self.price
    }
}

/// A price strictly between zero and [`PROMOTION_CEILING`].
pub fn is_promotion(price: &Price) -> bool {
    price
        .as_decimal()
        .is_some_and(|n| n > 0.0 && n < PROMOTION_CEILING)
}

/// Stable partition: promotional items first, each class in input order.
pub fn sort_promotion_first<T: Priced>(items: Vec<T>) -> Vec<T> {
    let (mut promoted, regular): (Vec<T>, Vec<T>) =
        items.into_iter().partition(|item| is_promotion(item.price()));
    promoted.extend(regular);
    promoted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(title: &str, price: Price) -> Product {
        Product {
            title: title.to_owned(),
            price,
            ..Product::default()
        }
    }

    #[test]
    fn promotion_bounds() {
        assert!(!is_promotion(&Price::from(0.0)));
        assert!(is_promotion(&Price::from(0.01)));
        assert!(is_promotion(&Price::from(199.99)));
        assert!(!is_promotion(&Price::from(200.0)));
        assert!(!is_promotion(&Price::from(-5.0)));
        assert!(is_promotion(&Price::from("149,90")));
        assert!(!is_promotion(&Price::from("")));
        assert!(!is_promotion(&Price::from("R$ 10")));
    }

    #[test]
    fn partition_is_stable() {
        let input = vec![
            product("a", Price::from(250.0)),
            product("b", Price::from(50.0)),
            product("c", Price::from(300.0)),
            product("d", Price::from(10.0)),
        ];
        let titles: Vec<_> = sort_promotion_first(input)
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn unparsable_prices_sink_in_order() {
        let input = vec![
            product("x", Price::from("")),
            product("y", Price::from("99,5")),
            product("z", Price::from("n/a")),
        ];
        let titles: Vec<_> = sort_promotion_first(input)
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["y", "x", "z"]);
    }
}
