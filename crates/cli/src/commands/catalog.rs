//! Catalog browsing commands.

use clap::Subcommand;
use kiosk_core::ProductId;
use kiosk_storefront::Storefront;
use kiosk_storefront::catalog::Product;

use super::CliError;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List products
    Products {
        /// Only products in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product in detail
    Product {
        /// Product ID
        id: ProductId,
    },
    /// List categories
    Categories,
}

#[allow(clippy::print_stdout)]
pub async fn run(storefront: &Storefront, action: CatalogAction) -> Result<(), CliError> {
    let catalog = storefront.catalog();
    match action {
        CatalogAction::Products { category } => {
            let products = catalog.products(category.as_deref()).await?;
            if products.is_empty() {
                println!("No products found.");
            }
            for product in &products {
                println!(
                    "{:>5}  {:<40} {:>10}  {}",
                    product.id.get(),
                    product.name,
                    product.price.to_string(),
                    stock_label(product),
                );
            }
        }
        CatalogAction::Product { id } => {
            let product = catalog.product(id).await?;
            println!("{} ({})", product.name, product.price);
            println!("  {}", stock_label(&product));
            for (label, value) in [
                ("Category", product.category.as_deref()),
                ("Brand", product.brand.as_deref()),
                ("Model", product.model.as_deref()),
                ("SKU", product.sku.as_deref()),
            ] {
                if let Some(value) = value {
                    println!("  {label}: {value}");
                }
            }
            if let Some(description) = &product.description {
                println!("\n{description}");
            }
            let features = product.feature_list();
            if !features.is_empty() {
                println!("\nFeatures:");
                for feature in features {
                    println!("  - {feature}");
                }
            }
            let specs = product.specification_rows();
            if !specs.is_empty() {
                println!("\nSpecifications:");
                for (key, value) in specs {
                    if key.is_empty() {
                        println!("  {value}");
                    } else {
                        println!("  {key}: {value}");
                    }
                }
            }
            let images = product.images();
            if !images.is_empty() {
                println!("\nImages:");
                for image in images {
                    match catalog.proxy_image_url(image) {
                        Ok(url) => println!("  {url}"),
                        Err(_) => println!("  {image}"),
                    }
                }
            }
        }
        CatalogAction::Categories => {
            for category in catalog.categories().await? {
                match &category.description {
                    Some(description) => {
                        println!("{:>5}  {}  - {description}", category.id.get(), category.name);
                    }
                    None => println!("{:>5}  {}", category.id.get(), category.name),
                }
            }
        }
    }
    Ok(())
}

fn stock_label(product: &Product) -> String {
    if product.in_stock() {
        format!("{} in stock", product.stock)
    } else {
        "out of stock".to_string()
    }
}
