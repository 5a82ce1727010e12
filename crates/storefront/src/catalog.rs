//! Static product catalog.
//!
//! Shown on category pages whenever there are no personal recommendations to
//! try on, and on the home page.

use fitting_room_core::{Category, Price, ProductId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub category: Category,
    pub name: &'static str,
    pub price: Price,
    pub image: &'static str,
}

/// A category tile on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTile {
    pub category: Category,
    pub image: &'static str,
}

struct Listing {
    id: u32,
    name: &'static str,
    dollars: u32,
    image: &'static str,
}

macro_rules! listing {
    ($id:expr, $name:expr, $dollars:expr, $photo:expr) => {
        Listing {
            id: $id,
            name: $name,
            dollars: $dollars,
            image: concat!(
                "https://images.unsplash.com/photo-",
                $photo,
                "?auto=format&fit=crop&q=80&w=800"
            ),
        }
    };
}

const HANDBAGS: &[Listing] = &[
    listing!(1, "Knott Medium Satchel", 398, "1591561954557-26941169b49e"),
    listing!(2, "Manhattan Large Tote", 428, "1584917865442-de89df76afd3"),
    listing!(3, "Smile Small Shoulder Bag", 298, "1548036328-c9fa89d128fa"),
    listing!(4, "Ruby Crossbody", 258, "1566150905458-1bf1fc113f0d"),
];

const WALLETS: &[Listing] = &[
    listing!(1, "Spencer Bifold Wallet", 158, "1560472355-536de3962603"),
    listing!(2, "Spade Flower Jacquard Wallet", 178, "1627123424574-724758594e93"),
    listing!(3, "Slim Bifold Wallet", 128, "1556905055-8f358a7a47b2"),
];

const WATCHES: &[Listing] = &[
    listing!(1, "Gold-Tone Metro Watch", 228, "1619946794135-5bc917a27793"),
    listing!(2, "Rose Gold Park Row Watch", 198, "1547996160-81dfa63595aa"),
    listing!(3, "Annadale Glitter Watch", 278, "1524592094714-0f0654e20314"),
];

const JEWELLERY: &[Listing] = &[
    listing!(1, "Pearl Drop Earrings", 78, "1611652022419-a9419f74343d"),
    listing!(2, "Spade Flower Pendant", 88, "1599643478518-a784e5dc4c8f"),
    listing!(3, "Heritage Spade Bangle", 98, "1535632066927-ab7c9ab60908"),
];

const CLOTHING: &[Listing] = &[
    listing!(1, "Spade Flower Cardigan", 298, "1525507119028-ed4c629a60a3"),
    listing!(2, "Ponte Fit and Flare Dress", 348, "1496747611176-843222e1e57c"),
    listing!(3, "Tweed Jacket", 498, "1552374196-1ab2a1c593e8"),
];

const HOME_TILES: [CategoryTile; 5] = [
    CategoryTile {
        category: Category::Handbags,
        image: "https://images.unsplash.com/photo-1597633125097-5a9961f1f03d?auto=format&fit=crop&q=80&w=800",
    },
    CategoryTile {
        category: Category::Wallets,
        image: "https://images.unsplash.com/photo-1606760227091-3dd870d97f1d?auto=format&fit=crop&q=80&w=800",
    },
    CategoryTile {
        category: Category::Watches,
        image: "https://images.unsplash.com/photo-1524805444758-089113d48a6d?auto=format&fit=crop&q=80&w=800",
    },
    CategoryTile {
        category: Category::Jewellery,
        image: "https://images.unsplash.com/photo-1599643477877-530eb83abc8e?auto=format&fit=crop&q=80&w=800",
    },
    CategoryTile {
        category: Category::Clothing,
        image: "https://images.unsplash.com/photo-1525507119028-ed4c629a60a3?auto=format&fit=crop&q=80&w=800",
    },
];

/// Featured on the home page: one product from each of the first four
/// categories.
const FEATURED: [(Category, u32); 4] = [
    (Category::Handbags, 1),
    (Category::Wallets, 2),
    (Category::Watches, 1),
    (Category::Jewellery, 1),
];

const fn listings(category: Category) -> &'static [Listing] {
    match category {
        Category::Handbags => HANDBAGS,
        Category::Wallets => WALLETS,
        Category::Watches => WATCHES,
        Category::Jewellery => JEWELLERY,
        Category::Clothing => CLOTHING,
    }
}

fn to_product(category: Category, listing: &Listing) -> Product {
    Product {
        id: ProductId::new(listing.id),
        category,
        name: listing.name,
        price: Price::usd(listing.dollars),
        image: listing.image,
    }
}

/// Every catalog product in `category`, in display order.
#[must_use]
pub fn products(category: Category) -> Vec<Product> {
    listings(category)
        .iter()
        .map(|l| to_product(category, l))
        .collect()
}

/// Look up one product.
#[must_use]
pub fn product(category: Category, id: ProductId) -> Option<Product> {
    listings(category)
        .iter()
        .find(|l| l.id == id.as_u32())
        .map(|l| to_product(category, l))
}

/// Category tiles for the home page, in navigation order.
#[must_use]
pub const fn home_categories() -> &'static [CategoryTile] {
    &HOME_TILES
}

/// Featured products for the home page.
#[must_use]
pub fn featured_products() -> Vec<Product> {
    FEATURED
        .iter()
        .filter_map(|&(category, id)| product(category, ProductId::new(id)))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_products() {
        for category in Category::ALL {
            let products = products(category);
            assert!(!products.is_empty(), "{category} has no products");
            assert!(products.iter().all(|p| p.category == category));
        }
        assert_eq!(products(Category::Handbags).len(), 4);
    }

    #[test]
    fn test_product_lookup() {
        let satchel = product(Category::Handbags, ProductId::new(1)).unwrap();
        assert_eq!(satchel.name, "Knott Medium Satchel");
        assert_eq!(satchel.price.to_string(), "$398.00");
        assert!(satchel.image.starts_with("https://images.unsplash.com/photo-"));

        assert!(product(Category::Wallets, ProductId::new(9)).is_none());
    }

    #[test]
    fn test_featured_products_resolve() {
        let featured = featured_products();
        assert_eq!(featured.len(), FEATURED.len());
        assert_eq!(featured.get(1).unwrap().name, "Spade Flower Jacquard Wallet");
    }

    #[test]
    fn test_home_categories_cover_all() {
        let tiles: Vec<Category> = home_categories().iter().map(|t| t.category).collect();
        assert_eq!(tiles, Category::ALL);
    }
}
