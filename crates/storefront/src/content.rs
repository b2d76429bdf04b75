//! Static site content: shop identity, testimonials, FAQ.

use crate::config::ContactConfig;

/// Shop identity rendered in the header, footer, and policy pages.
#[derive(Debug, Clone)]
pub struct SiteInfo {
    pub name: &'static str,
    pub tagline: &'static str,
    pub address: &'static str,
    pub phone: String,
    pub email: String,
    pub social: &'static [SocialLink],
}

#[derive(Debug, Clone, Copy)]
pub struct SocialLink {
    pub label: &'static str,
    pub url: &'static str,
}

const SOCIAL: &[SocialLink] = &[
    SocialLink {
        label: "Facebook",
        url: "https://www.facebook.com/profile.php?id=61587084541625",
    },
    SocialLink {
        label: "Instagram",
        url: "https://www.instagram.com/afrahorganicmart/",
    },
    SocialLink {
        label: "TikTok",
        url: "https://www.tiktok.com/@afrahorganicmart",
    },
];

impl SiteInfo {
    #[must_use]
    pub fn new(contact: &ContactConfig) -> Self {
        Self {
            name: "Afrah Organic Mart",
            tagline: "Bringing you the purest organic products from trusted sources. Freshness and quality guaranteed.",
            address: "Dhaka, Bangladesh",
            phone: contact.phone.clone(),
            email: contact.email.clone(),
            social: SOCIAL,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Testimonial {
    pub name: &'static str,
    pub title: &'static str,
    pub quote: &'static str,
    pub avatar: &'static str,
}

impl Testimonial {
    #[must_use]
    pub fn avatar_path(&self) -> String {
        format!("/static/images/{}.jpg", self.avatar)
    }
}

pub const TESTIMONIALS: &[Testimonial] = &[
    Testimonial {
        name: "Anika Rahman",
        title: "Regular Customer",
        quote: "The quality of dates from Afrah Organic Mart is unparalleled. Always fresh and delicious. My family loves them!",
        avatar: "avatar-1",
    },
    Testimonial {
        name: "Fazle Rabbi",
        title: "Health Enthusiast",
        quote: "I trust Afrah for all my organic needs. Their chia seeds and nuts are top-notch. Highly recommended for a healthy lifestyle.",
        avatar: "avatar-2",
    },
    Testimonial {
        name: "Sadia Islam",
        title: "Home Chef",
        quote: "The pickles and gur have an authentic taste that reminds me of my village. It's clear they use high-quality, pure ingredients.",
        avatar: "avatar-3",
    },
    Testimonial {
        name: "Karim Ahmed",
        title: "Fitness Coach",
        quote: "Excellent source of natural energy. The mixed nuts are my go-to snack before workouts. Fast delivery is a huge plus!",
        avatar: "avatar-4",
    },
];

#[derive(Debug, Clone, Copy)]
pub struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const FAQS: &[Faq] = &[
    Faq {
        question: "Are your products 100% organic?",
        answer: "Yes, all our products are sourced from certified organic farms and trusted suppliers. We are committed to providing only the purest and most natural products to our customers.",
    },
    Faq {
        question: "What is your delivery process?",
        answer: "We offer fast and reliable delivery across Bangladesh. Once you place an order, we process it within 24 hours and our delivery partner ensures it reaches you as quickly as possible, typically within 2-5 business days depending on your location.",
    },
    Faq {
        question: "What is your return policy?",
        answer: "If you are not satisfied with the quality of a product or if it's damaged, you can return it within 7 days of delivery. Please visit our Refund & Return Policy page for more details.",
    },
    Faq {
        question: "How can I pay for my order?",
        answer: "We offer Cash on Delivery (COD) and the mobile banking services bKash, Nagad, and Rocket.",
    },
    Faq {
        question: "How do I store the products to maintain freshness?",
        answer: "Each product comes with storage instructions. Generally, we recommend storing dry items like dates, nuts, and seeds in a cool, dry place in an airtight container. Perishable items should be refrigerated.",
    },
];
